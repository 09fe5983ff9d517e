//! Shared demo roster for local runs and tests.

use crate::models::StudentRecord;
use crate::roster::Roster;

pub struct DemoStudent {
    pub id: i64,
    pub name: &'static str,
    pub serial: i64,
}

pub const DEMO_STUDENTS: &[DemoStudent] = &[
    DemoStudent { id: 1001, name: "Ayesha Khan", serial: 1 },
    DemoStudent { id: 1002, name: "Bilal Ahmed", serial: 2 },
    DemoStudent { id: 1003, name: "Fatima Noor", serial: 3 },
    DemoStudent { id: 1004, name: "Hamza Siddiqui", serial: 4 },
    DemoStudent { id: 1005, name: "Iqra Baig", serial: 5 },
    DemoStudent { id: 1012, name: "Muhammad Ali", serial: 6 },
    DemoStudent { id: 1020, name: "Sana Malik", serial: 7 },
    DemoStudent { id: 1021, name: "Usman Tariq", serial: 8 },
    DemoStudent { id: 1022, name: "Zainab Hussain", serial: 9 },
    DemoStudent { id: 1023, name: "Ali Raza", serial: 10 },
    DemoStudent { id: 1024, name: "Ali Raza", serial: 11 },
    DemoStudent { id: 2001, name: "Hira Khan", serial: 12 },
    DemoStudent { id: 2002, name: "Kamran Akmal Khan", serial: 13 },
    DemoStudent { id: 2012, name: "Mahnoor Qureshi", serial: 14 },
    DemoStudent { id: 2120, name: "Saad  Khan", serial: 15 },
];

pub fn demo_records() -> Vec<StudentRecord> {
    DEMO_STUDENTS
        .iter()
        .map(|s| StudentRecord::new(s.id, s.name, s.serial))
        .collect()
}

pub fn demo_roster() -> Roster {
    Roster::from_records(demo_records())
}
