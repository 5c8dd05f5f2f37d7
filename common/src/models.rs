use serde::{Deserialize, Serialize};

use crate::session::CellView;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum Cell {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "revealed")]
    Revealed { hint: u8 },
    #[serde(rename = "bomb")]
    Bomb,
}

impl From<CellView> for Cell {
    fn from(value: CellView) -> Self {
        match value {
            CellView::Hidden => Self::Hidden,
            CellView::Revealed { hint } => Self::Revealed { hint },
            CellView::Bomb => Self::Bomb,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GameParams {
    pub level: u8,
}

impl Default for GameParams {
    fn default() -> Self {
        Self { level: 1 }
    }
}

#[derive(Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: String,
}
