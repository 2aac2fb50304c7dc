//! Prompt composition for department triage.
//!
//! The system part is fixed for the lifetime of the process; the human part
//! is rendered from a validated [`PatientInfo`]. Both are pure functions of
//! their input.

use crate::models::PatientInfo;
use std::sync::OnceLock;

/// A hospital department the model may recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Department {
    pub name: &'static str,
    pub scope: Option<&'static str>,
}

/// The departments offered to the model, in presentation order.
pub const DEPARTMENTS: [Department; 11] = [
    Department {
        name: "Kardiology",
        scope: Some("Jantung dan pembuluh darah"),
    },
    Department {
        name: "Neurology",
        scope: Some("Otak, tulang belakang, dan sistem saraf"),
    },
    Department {
        name: "Ortopedi",
        scope: Some("Tulang, sendi, ligamen"),
    },
    Department {
        name: "Gastroenterology",
        scope: Some("Sistem pencernaan, lambung, usus"),
    },
    Department {
        name: "Pulmonology",
        scope: Some("Paru-paru dan pernapasan"),
    },
    Department {
        name: "THT",
        scope: Some("Telinga, Hidung, Tenggorokan"),
    },
    Department {
        name: "Mata",
        scope: None,
    },
    Department {
        name: "Penyakit Dalam",
        scope: Some("Kondisi medis umum dan kronis"),
    },
    Department {
        name: "Ginekology",
        scope: Some("Kesehatan reproduksi wanita"),
    },
    Department {
        name: "Urology",
        scope: Some("Saluran kemih dan sistem reproduksi pria"),
    },
    Department {
        name: "Dermatology",
        scope: Some("Kulit"),
    },
];

const ROLE_INSTRUCTION: &str = "Anda adalah asisten triase AI yang ahli di rumah sakit Indonesia.\n\
Tugas Anda adalah merekomendasikan SATU departemen spesialis yang paling relevan\n\
berdasarkan data pasien.";

const OUTPUT_INSTRUCTION: &str = "Analisis data pasien dan berikan HANYA NAMA departemen yang paling sesuai.\n\
Jangan berikan penjelasan, hanya nama departemen.";

/// Separator between symptoms in the rendered patient data.
pub const SYMPTOM_SEPARATOR: &str = ", ";

/// The two-part prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub human: String,
}

/// Fixed instruction listing the valid departments and the output format.
pub fn system_prompt() -> &'static str {
    static SYSTEM_PROMPT: OnceLock<String> = OnceLock::new();
    SYSTEM_PROMPT.get_or_init(|| {
        let mut text = String::from(ROLE_INSTRUCTION);
        text.push_str("\n\nDaftar departemen yang valid adalah:\n");
        for department in DEPARTMENTS.iter() {
            match department.scope {
                Some(scope) => text.push_str(&format!("- {} ({})\n", department.name, scope)),
                None => text.push_str(&format!("- {}\n", department.name)),
            }
        }
        text.push('\n');
        text.push_str(OUTPUT_INSTRUCTION);
        text
    })
}

/// Render the per-request patient segment.
pub fn render_patient(patient: &PatientInfo) -> String {
    format!(
        "Data Pasien:\n- Jenis Kelamin: {}\n- Usia: {} tahun\n- Gejala: {}",
        patient.gender,
        patient.age,
        patient.symptoms.join(SYMPTOM_SEPARATOR)
    )
}

pub fn compose_prompt(patient: &PatientInfo) -> Prompt {
    Prompt {
        system: system_prompt(),
        human: render_patient(patient),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(gender: &str, age: i64, symptoms: &[&str]) -> PatientInfo {
        PatientInfo {
            gender: gender.to_string(),
            age,
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn renders_canonical_example() {
        let info = patient("female", 62, &["pusing", "mual", "sulit berjalan"]);

        assert_eq!(
            render_patient(&info),
            "Data Pasien:\n- Jenis Kelamin: female\n- Usia: 62 tahun\n- Gejala: pusing, mual, sulit berjalan"
        );
    }

    #[test]
    fn symptom_order_is_preserved() {
        let info = patient("male", 30, &["sesak napas", "batuk", "demam"]);
        let human = render_patient(&info);

        assert!(human.ends_with("- Gejala: sesak napas, batuk, demam"));
    }

    #[test]
    fn single_symptom_has_no_separator() {
        let info = patient("male", 5, &["ruam"]);
        assert!(render_patient(&info).ends_with("- Gejala: ruam"));
    }

    #[test]
    fn composition_is_deterministic() {
        let info = patient("female", 41, &["nyeri dada", "keringat dingin"]);

        let first = compose_prompt(&info);
        let second = compose_prompt(&info.clone());

        assert_eq!(first, second);
        assert_eq!(first.human.as_bytes(), second.human.as_bytes());
    }

    #[test]
    fn system_prompt_lists_every_department_once() {
        let system = system_prompt();
        let listed: Vec<&str> = system.lines().filter(|l| l.starts_with("- ")).collect();

        assert_eq!(listed.len(), DEPARTMENTS.len());
        assert_eq!(listed[0], "- Kardiology (Jantung dan pembuluh darah)");
        assert_eq!(listed[6], "- Mata");
        assert_eq!(listed[10], "- Dermatology (Kulit)");
    }

    #[test]
    fn system_prompt_demands_name_only() {
        let system = system_prompt();
        assert!(system.contains("berikan HANYA NAMA departemen"));
        assert!(system.contains("Jangan berikan penjelasan"));
    }

    #[test]
    fn system_prompt_does_not_depend_on_patient() {
        let a = compose_prompt(&patient("female", 62, &["pusing"]));
        let b = compose_prompt(&patient("male", 12, &["gatal"]));
        assert_eq!(a.system, b.system);
    }
}
