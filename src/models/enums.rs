use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Direction {
    Outbound => "outbound",
    Inbound => "inbound",
    System => "system",
});

str_enum!(Scene {
    Online => "online",
    Offline => "offline",
});

str_enum!(Role {
    User => "user",
    Assistant => "assistant",
    System => "system",
});

str_enum!(TransferStatus {
    Pending => "pending",
    Received => "received",
    Refunded => "refunded",
});

str_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
});

str_enum!(JudgmentKind {
    Request => "request",
    Response => "response",
    OfflineSummary => "offline_summary",
});

str_enum!(ForwardedKind {
    Text => "text",
    Photo => "photo",
    Voice => "voice",
    Location => "location",
    Card => "card",
});

impl Direction {
    /// The transcript role a conversational event of this direction maps to.
    pub fn role(&self) -> Role {
        match self {
            Direction::Outbound => Role::User,
            Direction::Inbound => Role::Assistant,
            Direction::System => Role::System,
        }
    }
}
