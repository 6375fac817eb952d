// Prompt constants and builders for the resume workflow.

use crate::models::student::StudentRecord;

/// Resume generation prompt.
/// Replace: {name}, {usn}, {email}, {phone}, {age}, {gender}, {address}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Create a professional resume for a student with the following information:

Name: {name}
USN: {usn}
Email: {email}
Phone: {phone}
Age: {age}
Gender: {gender}
Address: {address}

Please include sections for Education, Skills, Objective, and Contact Information in a clean, professional format.
Use markdown formatting for the resume."#;

/// Builds the generation prompt for one student. Pure and deterministic:
/// every record field is embedded verbatim, no I/O, no failure mode.
pub fn build_resume_prompt(student: &StudentRecord) -> String {
    RESUME_PROMPT_TEMPLATE
        .replace("{name}", &student.name)
        .replace("{usn}", &student.usn)
        .replace("{email}", &student.email)
        .replace("{phone}", &student.phone)
        .replace("{age}", &student.age)
        .replace("{gender}", &student.gender)
        .replace("{address}", &student.address)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_student() -> StudentRecord {
        StudentRecord {
            usn: "1XX22CS001".to_string(),
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "9876543210".to_string(),
            age: "21".to_string(),
            gender: "Male".to_string(),
            address: "12 College Road, Bengaluru".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_embeds_every_field() {
        let student = sample_student();
        let prompt = build_resume_prompt(&student);

        for value in [
            &student.usn,
            &student.name,
            &student.email,
            &student.phone,
            &student.age,
            &student.gender,
            &student.address,
        ] {
            assert!(prompt.contains(value.as_str()), "missing field value {value}");
        }
    }

    #[test]
    fn test_prompt_names_each_section_exactly_once() {
        let prompt = build_resume_prompt(&sample_student());

        for section in ["Education", "Skills", "Objective", "Contact Information"] {
            assert_eq!(
                prompt.matches(section).count(),
                1,
                "section {section} should appear exactly once"
            );
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let student = sample_student();
        assert_eq!(build_resume_prompt(&student), build_resume_prompt(&student));
    }

    #[test]
    fn test_prompt_leaves_no_placeholders() {
        let prompt = build_resume_prompt(&sample_student());
        assert!(!prompt.contains('{') && !prompt.contains('}'));
    }
}
