use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upload categories accepted by the backend
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Arts,
    Business,
    Education,
    Entertainment,
    #[serde(rename = "Kids & Family")]
    KidsAndFamily,
    Music,
    Science,
    Tech,
    Others,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Arts,
        Category::Business,
        Category::Education,
        Category::Entertainment,
        Category::KidsAndFamily,
        Category::Music,
        Category::Science,
        Category::Tech,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Arts => "Arts",
            Category::Business => "Business",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::KidsAndFamily => "Kids & Family",
            Category::Music => "Music",
            Category::Science => "Science",
            Category::Tech => "Tech",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
