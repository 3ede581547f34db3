use rust_decimal::Decimal;
use serde::Serialize;

pub const DEFAULT_SKIN: &str = "baseNetwork";

/// 0.0005 in the chain's native currency.
const RETRO_PRICE: Decimal = Decimal::from_parts(5, 0, 0, false, 4);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    pub body_color: &'static str,
    pub head_color: &'static str,
    pub food_color: &'static str,
    pub background_color: &'static str,
    pub grid_line_color: &'static str,
    pub locked: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub description: &'static str,
}

pub static SKINS: [SkinDefinition; 6] = [
    SkinDefinition {
        id: "baseNetwork",
        display_name: "Base Network",
        body_color: "#0052FF",
        head_color: "#0049E0",
        food_color: "#00D4FF",
        background_color: "#0A0B0D",
        grid_line_color: "#1e293b",
        locked: false,
        price: Decimal::ZERO,
        description: "Official Base colors 🔵",
    },
    SkinDefinition {
        id: "nokia3310",
        display_name: "Nokia 3310",
        body_color: "#000000",
        head_color: "#000000",
        food_color: "#000000",
        background_color: "#9bc700",
        grid_line_color: "#8ba600",
        locked: false,
        price: Decimal::ZERO,
        description: "Classic monochrome LCD 📱",
    },
    SkinDefinition {
        id: "gameboy",
        display_name: "Game Boy",
        body_color: "#0f380f",
        head_color: "#0f380f",
        food_color: "#0f380f",
        background_color: "#9bbc0f",
        grid_line_color: "#8bac0f",
        locked: false,
        price: Decimal::ZERO,
        description: "1989 nostalgia 🎮",
    },
    SkinDefinition {
        id: "atari",
        display_name: "Atari 2600",
        body_color: "#d85000",
        head_color: "#c84000",
        food_color: "#fcfc00",
        background_color: "#000000",
        grid_line_color: "#1a0000",
        locked: true,
        price: RETRO_PRICE,
        description: "Retro console legend 🕹️",
    },
    SkinDefinition {
        id: "commodore64",
        display_name: "Commodore 64",
        body_color: "#4040e0",
        head_color: "#3030d0",
        food_color: "#a0a0a0",
        background_color: "#4040e0",
        grid_line_color: "#3030d0",
        locked: true,
        price: RETRO_PRICE,
        description: "80s computer aesthetic 💾",
    },
    SkinDefinition {
        id: "arcade",
        display_name: "Arcade CRT",
        body_color: "#00ff00",
        head_color: "#00dd00",
        food_color: "#ffff00",
        background_color: "#000000",
        grid_line_color: "#001a00",
        locked: true,
        price: RETRO_PRICE,
        description: "Green phosphor glow 👾",
    },
];

pub fn find(id: &str) -> Option<&'static SkinDefinition> {
    SKINS.iter().find(|skin| skin.id == id)
}

pub fn unlocked_ids() -> impl Iterator<Item = &'static str> {
    SKINS.iter().filter(|skin| !skin.locked).map(|skin| skin.id)
}
