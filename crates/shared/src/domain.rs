use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidRating;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(PdfId);

/// Display label of the stock BART checkpoint; the backend knows it as `pretrained`.
pub const PRETRAINED_DISPLAY_LABEL: &str = "bart-large";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    Pretrained,
    FineTuned,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Pretrained => "pretrained",
            ModelType::FineTuned => "fine-tuned",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelType::Pretrained => "BART-Large",
            ModelType::FineTuned => "Fine-Tuned BART",
        }
    }
}

/// Maps a model label picked in the UI to the `model_type` value the backend expects.
///
/// Only `bart-large` is translated; every other label goes out verbatim.
pub fn model_type_for_label(label: &str) -> String {
    if label == PRETRAINED_DISPLAY_LABEL {
        ModelType::Pretrained.as_str().to_string()
    } else {
        label.to_string()
    }
}

/// Star rating attached to feedback, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, InvalidRating> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(InvalidRating(stars))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub text: String,
    pub model_used: String,
}
