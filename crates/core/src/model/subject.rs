use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("unknown subject: {0}")]
    Unknown(String),
}

/// Academic subjects offered by the practice bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subject {
    Biology,
    GeneralChemistry,
    OrganicChemistry,
    ReadingComprehension,
    Physics,
    QuantitativeReasoning,
}

/// Static per-subject configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectProfile {
    /// Questions per practice test.
    pub question_count: u32,
    /// Number of practice tests offered.
    pub test_count: u32,
    /// Whether a reference exhibit (periodic table, formula sheet) is available.
    pub has_exhibit: bool,
    pub duration_minutes: u32,
    pub topics: &'static [&'static str],
}

const BIOLOGY_TOPICS: &[&str] = &[
    "Cell Biology",
    "Genetics & Evolution",
    "Physiology",
    "Ecology & Biochemistry",
];
const CHEMISTRY_TOPICS: &[&str] = &[
    "Stoichiometry & General Concepts",
    "Atomic & Molecular Structure",
    "Chemical Equilibrium",
    "Liquids and Solids",
    "Gases",
    "Acids and Bases",
    "Thermochemistry & Thermodynamics",
    "Chemical Kinetics",
];
const ORGANIC_CHEMISTRY_TOPICS: &[&str] = &[
    "Nomenclature & Structure",
    "Isomers & Stereochemistry",
    "Acids, Bases & Nucleophiles",
    "Substitution & Elimination Reactions",
    "Carbonyl Chemistry",
    "Aromaticity & Spectroscopy",
    "Spectroscopy & Analysis",
];
const READING_TOPICS: &[&str] = &[
    "Main Idea & Purpose",
    "Detail & Inference",
    "Reasoning & Logic",
    "Vocabulary in Context",
    "Passage Analysis",
];
const PHYSICS_TOPICS: &[&str] = &[
    "Mechanics & Motion",
    "Fluids & Solids",
    "Electrostatics & Circuits",
    "Magnetism & Induction",
    "Waves & Optics",
    "Thermodynamics & Heat",
    "Modern Physics",
    "Advanced Kinematics",
];
const QUANTITATIVE_TOPICS: &[&str] = &[
    "Algebra & Functions",
    "Geometry & Measurement",
    "Data Analysis & Probability",
    "Statistics & Experimental Methods",
    "Logic & Problem Solving",
];

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Biology,
        Subject::GeneralChemistry,
        Subject::OrganicChemistry,
        Subject::ReadingComprehension,
        Subject::Physics,
        Subject::QuantitativeReasoning,
    ];

    /// Stable identifier used in storage keys, routes and bank file names.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Subject::Biology => "biology",
            Subject::GeneralChemistry => "general-chemistry",
            Subject::OrganicChemistry => "organic-chemistry",
            Subject::ReadingComprehension => "reading-comprehension",
            Subject::Physics => "physics",
            Subject::QuantitativeReasoning => "quantitative-reasoning",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Biology => "Biology",
            Subject::GeneralChemistry => "General Chemistry",
            Subject::OrganicChemistry => "Organic Chemistry",
            Subject::ReadingComprehension => "Reading Comprehension",
            Subject::Physics => "Physics",
            Subject::QuantitativeReasoning => "Quantitative Reasoning",
        }
    }

    /// # Errors
    ///
    /// Returns `SubjectError::Unknown` if the slug names no subject.
    pub fn from_slug(slug: &str) -> Result<Self, SubjectError> {
        Self::ALL
            .into_iter()
            .find(|s| s.slug() == slug)
            .ok_or_else(|| SubjectError::Unknown(slug.to_string()))
    }

    #[must_use]
    pub fn profile(self) -> SubjectProfile {
        match self {
            Subject::Biology => SubjectProfile {
                question_count: 40,
                test_count: 10,
                has_exhibit: false,
                duration_minutes: 30,
                topics: BIOLOGY_TOPICS,
            },
            Subject::GeneralChemistry => SubjectProfile {
                question_count: 30,
                test_count: 10,
                has_exhibit: true,
                duration_minutes: 30,
                topics: CHEMISTRY_TOPICS,
            },
            Subject::OrganicChemistry => SubjectProfile {
                question_count: 30,
                test_count: 1,
                has_exhibit: false,
                duration_minutes: 30,
                topics: ORGANIC_CHEMISTRY_TOPICS,
            },
            Subject::ReadingComprehension => SubjectProfile {
                question_count: 50,
                test_count: 15,
                has_exhibit: false,
                duration_minutes: 30,
                topics: READING_TOPICS,
            },
            Subject::Physics => SubjectProfile {
                question_count: 40,
                test_count: 10,
                has_exhibit: false,
                duration_minutes: 30,
                topics: PHYSICS_TOPICS,
            },
            Subject::QuantitativeReasoning => SubjectProfile {
                question_count: 40,
                test_count: 15,
                has_exhibit: true,
                duration_minutes: 45,
                topics: QUANTITATIVE_TOPICS,
            },
        }
    }

    #[must_use]
    pub fn topics(self) -> &'static [&'static str] {
        self.profile().topics
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Subject {
    type Err = SubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreBucket;

    #[test]
    fn slugs_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(Subject::from_slug(subject.slug()).unwrap(), subject);
        }
        assert!(matches!(
            "chemistry".parse::<Subject>(),
            Err(SubjectError::Unknown(_))
        ));
    }

    #[test]
    fn question_counts_have_their_own_score_table() {
        for subject in Subject::ALL {
            let profile = subject.profile();
            let bucket = ScoreBucket::for_total(i64::from(profile.question_count));
            assert_eq!(
                bucket.max_correct(),
                usize::try_from(profile.question_count).unwrap(),
                "{subject}"
            );
            assert!(!profile.topics.is_empty());
        }
    }

    #[test]
    fn exhibits_only_for_chemistry_and_quant() {
        let with_exhibit: Vec<_> = Subject::ALL
            .into_iter()
            .filter(|s| s.profile().has_exhibit)
            .collect();
        assert_eq!(
            with_exhibit,
            vec![Subject::GeneralChemistry, Subject::QuantitativeReasoning]
        );
    }

    #[test]
    fn serde_uses_slugs() {
        let json = serde_json::to_string(&Subject::ReadingComprehension).unwrap();
        assert_eq!(json, "\"reading-comprehension\"");
    }
}
