use serde::Serialize;

/// Decoration for a grid cell. Icons carry no game meaning; only the hidden color does.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AppIcon {
    pub emoji: &'static str,
    pub label: &'static str,
}

const fn app(emoji: &'static str, label: &'static str) -> AppIcon {
    AppIcon { emoji, label }
}

pub const APP_LIST: [AppIcon; 25] = [
    app("📞", "Phone"),
    app("💬", "Messages"),
    app("📧", "Mail"),
    app("📷", "Camera"),
    app("🖼️", "Photos"),
    app("📘", "Facebook"),
    app("🐦", "Twitter"),
    app("📸", "Instagram"),
    app("👾", "Discord"),
    app("🎵", "Spotify"),
    app("▶️", "YouTube"),
    app("🗺️", "Maps"),
    app("🧭", "Browser"),
    app("📝", "Notes"),
    app("🗓️", "Calendar"),
    app("🛠️", "Settings"),
    app("💻", "GitHub"),
    app("🧠", "AI"),
    app("🛒", "Shop"),
    app("🎮", "Games"),
    app("💡", "Ideas"),
    app("📁", "Files"),
    app("🌐", "Chrome"),
    app("✉️", "Gmail"),
    app("📚", "Docs"),
];
