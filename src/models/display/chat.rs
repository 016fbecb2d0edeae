//! Chat display models

use serde::Serialize;
use tabled::Tabled;

use super::common::format_datetime;
use crate::client::models::User;
use crate::view::{ChatLine, Side};

/// Chat user row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct UserDisplay {
    #[tabled(rename = "USER ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "EMAIL")]
    pub email: String,
}

impl From<&User> for UserDisplay {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name().to_string(),
            email: user.email.clone().unwrap_or_else(|| "--".to_string()),
        }
    }
}

/// One conversation line
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MessageDisplay {
    #[tabled(rename = "TIME")]
    pub time: String,

    #[tabled(rename = "FROM")]
    pub from: String,

    #[tabled(rename = "MESSAGE")]
    pub body: String,
}

impl MessageDisplay {
    /// `counterpart` names the other side of the conversation
    pub fn from_line(line: &ChatLine, counterpart: &str) -> Self {
        Self {
            time: format_datetime(line.at),
            from: match line.side {
                Side::Mine => "me".to_string(),
                Side::Theirs => counterpart.to_string(),
            },
            body: line.body.clone(),
        }
    }
}
