use serde::{Deserialize, Serialize};

use crate::models::Cell;

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "reveal")]
    Reveal { index: usize },
    #[serde(rename = "restart")]
    Restart { level: u8 },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct CellUpdate {
    pub index: usize,
    pub value: Cell,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        level: u8,
        cells: usize,
        columns: usize,
        bombs: usize,
        score: usize,
        /// Cell views in index order; `field[i - 1]` is cell `i`.
        field: Vec<Cell>,
    },
    #[serde(rename = "update")]
    Update {
        updates: Vec<CellUpdate>,
        score: usize,
        won: bool,
        lost: bool,
        message: String,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_actions() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"action":"reveal","index":12}"#).unwrap();
        assert!(matches!(message, ClientMessage::Reveal { index: 12 }));

        let message: ClientMessage =
            serde_json::from_str(r#"{"action":"restart","level":3}"#).unwrap();
        assert!(matches!(message, ClientMessage::Restart { level: 3 }));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"flag","index":1}"#).is_err());
    }

    #[test]
    fn update_carries_score_line() {
        let message = ServerMessage::Update {
            updates: vec![CellUpdate {
                index: 4,
                value: Cell::Revealed { hint: 1 },
            }],
            score: 1,
            won: false,
            lost: false,
            message: "Your score is 1".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["updates"][0]["index"], 4);
        assert_eq!(json["updates"][0]["value"]["state"], "revealed");
        assert_eq!(json["message"], "Your score is 1");
    }
}
