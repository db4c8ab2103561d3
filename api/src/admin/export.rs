//! CSV export of every registration

use chrono::{DateTime, Utc};
use shared::RegistrationRecord;

const HEADERS: [&str; 20] = [
    "ID",
    "First Name",
    "Last Name",
    "Username",
    "Email",
    "Mobile",
    "Date of Birth",
    "Age",
    "Gender",
    "Address",
    "Postal Code",
    "Country",
    "State",
    "City",
    "Education",
    "Security Question",
    "Guardian Name",
    "Guardian Email",
    "Guardian Phone",
    "Registration Date",
];

pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("registrations_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// RFC 4180 document, CRLF line endings
pub fn registrations_csv(records: &[RegistrationRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADERS.iter().map(|h| h.to_string()));
    for record in records {
        push_row(&mut out, row(record));
    }
    out
}

fn row(record: &RegistrationRecord) -> impl Iterator<Item = String> {
    [
        record.id.to_string(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.username.clone(),
        record.email.clone(),
        record.mobile.clone(),
        record.dob.format("%Y-%m-%d").to_string(),
        record.age.to_string(),
        record.gender.clone(),
        record.address.clone(),
        record.postal_code.clone(),
        record.country.clone(),
        record.state.clone(),
        record.city.clone(),
        record.education.clone(),
        record.security_question.clone(),
        record.guardian_name.clone().unwrap_or_default(),
        record.guardian_email.clone().unwrap_or_default(),
        record.guardian_phone.clone().unwrap_or_default(),
        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
    .into_iter()
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let line: Vec<String> = cells.map(|cell| escape(&cell)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn record() -> RegistrationRecord {
        let created = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
        RegistrationRecord {
            id: 7,
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            username: "alice_01".into(),
            email: "alice@mail.com".into(),
            mobile: "9876543211".into(),
            dob: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            age: 25,
            gender: "female".into(),
            address: "42 Baker Street, London".into(),
            postal_code: "560001".into(),
            country: "India".into(),
            state: "Karnataka".into(),
            city: "Bangalore".into(),
            education: "Bachelors".into(),
            profile_photo: None,
            security_question: "Your \"first\" pet?".into(),
            security_answer: "Fluffy".into(),
            password_hash: "sha256$1$00$00".into(),
            guardian_name: None,
            guardian_email: None,
            guardian_phone: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_csv_layout() {
        let csv = registrations_csv(&[record()]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert!(lines[0].starts_with("ID,First Name,Last Name,Username"));
        assert!(lines[0].ends_with("Registration Date"));
        assert_eq!(
            lines[1],
            "7,Alice,Liddell,alice_01,alice@mail.com,9876543211,2000-01-01,25,female,\
             \"42 Baker Street, London\",560001,India,Karnataka,Bangalore,Bachelors,\
             \"Your \"\"first\"\" pet?\",,,,2025-06-15 09:30:00"
        );
        assert!(!csv.contains("Fluffy"));
        assert!(!csv.contains("sha256"));
    }

    #[test]
    fn test_filename() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 5).unwrap();
        assert_eq!(export_filename(now), "registrations_20250615_093005.csv");
    }
}
