use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Doctor => "doctor",
    Patient => "patient",
    Parent => "parent",
    Nurse => "nurse",
    Lab => "lab",
    Admin => "admin",
});

impl Role {
    /// Parses the role strings the auth backend hands out.
    ///
    /// Case-insensitive; `LAB_TECHNICIAN` is the backend name for `lab`.
    pub fn from_backend(raw: &str) -> Result<Self, ModelError> {
        let lowered = raw.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "lab_technician" | "lab-technician" => Ok(Self::Lab),
            other => other.parse(),
        }
    }

    /// Dashboard landing path for this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Doctor => "/doctor/dashboard",
            Self::Patient => "/patient/dashboard",
            Self::Parent => "/parent/dashboard",
            Self::Nurse => "/nurse/dashboard",
            Self::Lab => "/lab/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// Whether this role sees the clinic-wide schedule rather than its own.
    pub fn sees_full_schedule(&self) -> bool {
        matches!(self, Self::Doctor | Self::Nurse | Self::Admin)
    }
}

str_enum!(WeekStart {
    Sunday => "sunday",
    Monday => "monday",
});

impl Default for WeekStart {
    fn default() -> Self {
        Self::Sunday
    }
}

impl WeekStart {
    pub fn weekday(&self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
        }
    }

    /// Days between `day` and the most recent week start (0..=6).
    pub fn offset_of(&self, day: chrono::Weekday) -> u32 {
        match self {
            Self::Sunday => day.num_days_from_sunday(),
            Self::Monday => day.num_days_from_monday(),
        }
    }
}
