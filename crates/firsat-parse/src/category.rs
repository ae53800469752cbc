// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category resolution by keyword membership.
//!
//! The taxonomy is a fixed five-bucket table; the first category whose
//! keyword list hits the lowercased message text wins, and anything
//! unmatched lands in the general bucket.

use firsat_core::types::DEFAULT_CATEGORY;

/// Category taxonomy with keyword lists, in match-priority order.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "bilgisayar",
        &[
            "bilgisayar", "computer", "laptop", "notebook", "ekran kartı", "gpu", "rtx", "gtx",
            "işlemci", "cpu", "anakart", "ram", "ssd", "monitör", "klavye", "mouse", "webcam",
            "pc",
        ],
    ),
    (
        "mobil_cihazlar",
        &[
            "telefon", "phone", "smartphone", "iphone", "tablet", "ipad", "akıllı saat",
            "smartwatch", "bileklik", "powerbank", "kulaklık", "airpods",
        ],
    ),
    (
        "konsol_oyun",
        &[
            "konsol", "console", "playstation", "ps5", "ps4", "xbox", "nintendo", "switch",
            "oyun", "game", "gamepad", "steam", "game pass", "ps plus",
        ],
    ),
    (
        "ev_elektronigi_yasam",
        &[
            "televizyon", "tv", "robot süpürge", "süpürge", "akıllı ev", "smart home",
            "airfryer", "fritöz", "klima", "ütü", "kahve makinesi", "blender", "buzdolabı",
        ],
    ),
    (
        "ag_yazilim",
        &[
            "modem", "router", "mesh", "yazılım", "software", "antivirüs", "antivirus", "vpn",
            "lisans", "windows", "office",
        ],
    ),
];

/// Resolves the category id for a message text.
///
/// Always returns a valid taxonomy id; unmatched text falls back to
/// [`DEFAULT_CATEGORY`].
pub fn detect_category(text: &str) -> String {
    let lower = text.to_lowercase();
    for (category_id, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return (*category_id).to_string();
        }
    }
    DEFAULT_CATEGORY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_models_resolve_to_computing() {
        assert_eq!(detect_category("RTX 4090 indirimde"), "bilgisayar");
        assert_eq!(detect_category("Ekran kartı fırsatı"), "bilgisayar");
    }

    #[test]
    fn phones_resolve_to_mobile() {
        assert_eq!(detect_category("iPhone 15 Pro Max"), "mobil_cihazlar");
    }

    #[test]
    fn consoles_resolve_to_gaming() {
        assert_eq!(detect_category("PlayStation 5 stoklarda"), "konsol_oyun");
    }

    #[test]
    fn home_electronics_match() {
        assert_eq!(
            detect_category("Robot süpürge kampanyası"),
            "ev_elektronigi_yasam"
        );
    }

    #[test]
    fn networking_and_software_match() {
        assert_eq!(detect_category("Modem + mesh paketi"), "ag_yazilim");
    }

    #[test]
    fn unmatched_text_gets_default_category() {
        assert_eq!(detect_category("Çorap 3'lü paket"), DEFAULT_CATEGORY);
        assert_eq!(detect_category(""), DEFAULT_CATEGORY);
    }

    #[test]
    fn earlier_categories_win_ties() {
        // "laptop" (computing) appears before "kulaklık" (mobile) in the table.
        assert_eq!(
            detect_category("Laptop alana kulaklık hediye"),
            "bilgisayar"
        );
    }
}
