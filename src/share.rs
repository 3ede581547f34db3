//! Score share links for social posting.

use serde::Serialize;

pub const SHARE_TITLE: &str = "Base Snake Game Score";

/// Scores above this get a flame.
const HOT_SCORE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    pub score: u32,
    pub twitter: String,
    pub farcaster: String,
    pub title: &'static str,
    pub text: String,
    pub url: String,
}

fn brag(score: u32) -> String {
    let flame = if score > HOT_SCORE { " 🔥" } else { "" };
    format!("🐍 I just scored {score} points in Base Snake Game!{flame}\n\nCan you beat my score?")
}

pub fn twitter_url(score: u32, game_url: &str) -> String {
    let text = format!("{}\n\nPlay now 👇", brag(score));
    format!(
        "https://twitter.com/intent/tweet?text={}&url={}",
        urlencoding::encode(&text),
        urlencoding::encode(game_url)
    )
}

pub fn farcaster_url(score: u32, game_url: &str) -> String {
    format!(
        "https://warpcast.com/~/compose?text={}&embeds[]={}",
        urlencoding::encode(&brag(score)),
        urlencoding::encode(game_url)
    )
}

pub fn share_links(score: u32, game_url: &str) -> ShareLinks {
    ShareLinks {
        score,
        twitter: twitter_url(score, game_url),
        farcaster: farcaster_url(score, game_url),
        title: SHARE_TITLE,
        text: format!("{}\n\n{game_url}", brag(score)),
        url: game_url.to_string(),
    }
}
