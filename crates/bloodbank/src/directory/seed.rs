//! Default donors written on first use.

use chrono::NaiveDate;

use crate::model::{BloodGroup, Donor, Gender};

struct SeedRow {
    id: &'static str,
    name: &'static str,
    age: u8,
    gender: Gender,
    blood_group: BloodGroup,
    phone: &'static str,
    email: &'static str,
    city: &'static str,
    last_donation: Option<(i32, u32, u32)>,
    available: bool,
    notes: Option<&'static str>,
}

const SEED_ROWS: &[SeedRow] = &[
    SeedRow {
        id: "seed-001",
        name: "Aarav Sharma",
        age: 29,
        gender: Gender::Male,
        blood_group: BloodGroup::OPositive,
        phone: "9876501234",
        email: "aarav.sharma@example.com",
        city: "Delhi",
        last_donation: Some((2024, 1, 12)),
        available: true,
        notes: Some("Prefers weekend calls"),
    },
    SeedRow {
        id: "seed-002",
        name: "Priya Nair",
        age: 34,
        gender: Gender::Female,
        blood_group: BloodGroup::APositive,
        phone: "9812345670",
        email: "priya.nair@example.com",
        city: "Kochi",
        last_donation: Some((2023, 11, 3)),
        available: true,
        notes: None,
    },
    SeedRow {
        id: "seed-003",
        name: "Rahul Verma",
        age: 41,
        gender: Gender::Male,
        blood_group: BloodGroup::BPositive,
        phone: "9900112233",
        email: "rahul.verma@example.com",
        city: "Mumbai",
        last_donation: None,
        available: false,
        notes: Some("Travelling until next quarter"),
    },
    SeedRow {
        id: "seed-004",
        name: "Sneha Iyer",
        age: 26,
        gender: Gender::Female,
        blood_group: BloodGroup::ONegative,
        phone: "9845098450",
        email: "sneha.iyer@example.com",
        city: "Chennai",
        last_donation: Some((2024, 2, 20)),
        available: true,
        notes: None,
    },
    SeedRow {
        id: "seed-005",
        name: "Vikram Singh",
        age: 52,
        gender: Gender::Male,
        blood_group: BloodGroup::AbPositive,
        phone: "9765432109",
        email: "vikram.singh@example.com",
        city: "Jaipur",
        last_donation: Some((2023, 8, 30)),
        available: true,
        notes: None,
    },
    SeedRow {
        id: "seed-006",
        name: "Ananya Das",
        age: 23,
        gender: Gender::Female,
        blood_group: BloodGroup::ANegative,
        phone: "9830012345",
        email: "ananya.das@example.com",
        city: "Kolkata",
        last_donation: None,
        available: true,
        notes: Some("First-time donor"),
    },
    SeedRow {
        id: "seed-007",
        name: "Karan Mehta",
        age: 38,
        gender: Gender::Male,
        blood_group: BloodGroup::BNegative,
        phone: "9898989898",
        email: "karan.mehta@example.com",
        city: "Ahmedabad",
        last_donation: Some((2024, 3, 5)),
        available: false,
        notes: None,
    },
    SeedRow {
        id: "seed-008",
        name: "Sam Fernandes",
        age: 31,
        gender: Gender::Other,
        blood_group: BloodGroup::OPositive,
        phone: "9822334455",
        email: "sam.fernandes@example.com",
        city: "Pune",
        last_donation: Some((2023, 12, 18)),
        available: true,
        notes: None,
    },
];

/// The fixed donor set used to populate an empty directory.
#[must_use]
pub fn seed_donors() -> Vec<Donor> {
    SEED_ROWS
        .iter()
        .map(|row| Donor {
            id: row.id.to_string(),
            name: row.name.to_string(),
            age: row.age,
            gender: row.gender,
            blood_group: row.blood_group,
            phone: row.phone.to_string(),
            email: row.email.to_string(),
            city: row.city.to_string(),
            last_donation_date: row
                .last_donation
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            available: row.available,
            notes: row.notes.map(str::to_string),
        })
        .collect()
}
