use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The fixed palette an app cell can be tinted with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppColor {
    Red,
    Blue,
    Green,
    Orange,
    Yellow,
}

impl AppColor {
    pub const PALETTE: [AppColor; 5] = [
        AppColor::Red,
        AppColor::Blue,
        AppColor::Green,
        AppColor::Orange,
        AppColor::Yellow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AppColor::Red => "red",
            AppColor::Blue => "blue",
            AppColor::Green => "green",
            AppColor::Orange => "orange",
            AppColor::Yellow => "yellow",
        }
    }
}

impl Display for AppColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
