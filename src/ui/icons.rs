//! Shared UI icons and emojis.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Instance kinds
pub static PRODUCTION: Emoji<'_, '_> = Emoji("🏭 ", "[PROD]");
pub static DEVELOPMENT: Emoji<'_, '_> = Emoji("🧪 ", "[DEV]");

// Repository indicators
pub static GIT: Emoji<'_, '_> = Emoji("🔗 ", "[GIT]");
pub static FILE_NEW: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static FILE_MOD: Emoji<'_, '_> = Emoji("📝 ", "~");
pub static FILE_DEL: Emoji<'_, '_> = Emoji("🗑️  ", "-");

// Dashboard
pub static SERVER: Emoji<'_, '_> = Emoji("🖥️  ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");
