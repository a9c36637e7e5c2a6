//! Compiled-in catalog for `GameController.java`.
//!
//! The default [`RecordLayout`] describes multi-line `games.add(new Game(...));`
//! constructor calls whose trailing arguments are `storeUrl` (a quoted string,
//! empty when unknown) and `userRating` (a bare number, `0.0` when unknown).
//!
//! One lookup table ships per anchor strategy. The image-fragment table is
//! ordered so that no pattern shadows a later one under first-declared
//! matching; the `catalog_tables_have_no_hazards` test keeps it that way.

use slotfill_core::{AnchorStrategy, FallbackRule, LookupTable, RecordLayout, SlotField};

/// Substrings identifying the cover-image line of a record.
pub const ANCHOR_MARKERS: &[&str] = &[
    "cloudflare.steamstatic.com",
    "chesscomfiles",
    "rgpub.io",
    "nintendo.com",
    "bnetcmsus",
];

pub fn default_layout() -> RecordLayout {
    RecordLayout {
        record_start: r"new\s+Game\s*\(".to_string(),
        record_end: r"^\s*\)\s*\)\s*;\s*$".to_string(),
        declared_name: r#"new\s+Game\s*\(\s*[^,]*,\s*"((?:[^"\\]|\\.)*)""#.to_string(),
        anchor_markers: ANCHOR_MARKERS.iter().map(|m| m.to_string()).collect(),
        comment_prefix: "//".to_string(),
        separator: ",".to_string(),
        slots: vec![
            SlotField::quoted("storeUrl", "\"\""),
            SlotField::bare("userRating", "0.0"),
        ],
    }
}

/// Cover-image fragment → `[storeUrl, userRating]`.
pub fn image_table() -> LookupTable {
    LookupTable::from_static(IMAGE_FRAGMENTS)
}

/// Display name → `[storeUrl, userRating]`.
pub fn title_table() -> LookupTable {
    LookupTable::from_static(TITLES)
}

/// 1-based record position → `[storeUrl]`. Records 1 and 2 shipped with
/// their links already filled.
pub fn ordinal_table() -> LookupTable {
    LookupTable::from_static(POSITIONS)
}

pub fn table_for(strategy: AnchorStrategy) -> LookupTable {
    match strategy {
        AnchorStrategy::LineAdjacency => image_table(),
        AnchorStrategy::DeclaredName => title_table(),
        AnchorStrategy::Ordinal => ordinal_table(),
    }
}

/// Derive a Steam store link from the app id embedded in a CDN image URL.
pub fn steam_app_fallback() -> FallbackRule {
    FallbackRule {
        capture: r"/apps/(\d+)/".to_string(),
        template: "https://store.steampowered.com/app/${1}/".to_string(),
    }
}

const IMAGE_FRAGMENTS: &[(&str, &[&str])] = &[
    ("1135690", &["https://store.steampowered.com/app/1135690/Unpacking/"]),
    ("1455840", &["https://store.steampowered.com/app/1455840/Dorfromantik/"]),
    ("1003590", &["https://store.steampowered.com/app/1003590/Tetris_Effect_Connected/"]),
    ("588650", &["https://store.steampowered.com/app/588650/Dead_Cells/"]),
    ("252950", &["https://store.steampowered.com/app/252950/Rocket_League/"]),
    ("736260", &["https://store.steampowered.com/app/736260/Baba_Is_You/"]),
    ("1145360", &["https://store.steampowered.com/app/1145360/Hades/"]),
    ("413150", &["https://store.steampowered.com/app/413150/Stardew_Valley/"]),
    ("646570", &["https://store.steampowered.com/app/646570/Slay_the_Spire/"]),
    ("1172470", &["https://store.steampowered.com/app/1172470/Apex_Legends/", "4.2"]),
    ("1290000", &["https://store.steampowered.com/app/1290000/PowerWash_Simulator/", "4.7"]),
    ("590380", &["https://store.steampowered.com/app/590380/Into_the_Breach/", "4.6"]),
    ("292030", &["https://store.steampowered.com/app/292030/The_Witcher_3_Wild_Hunt/", "4.9"]),
    ("1366220", &["https://www.minecraft.net/", "4.8"]),
    ("374320", &["https://store.steampowered.com/app/374320/DARK_SOULS_III/", "4.7"]),
    ("289070", &["https://store.steampowered.com/app/289070/Sid_Meiers_Civilization_VI/", "4.5"]),
    ("1055540", &["https://store.steampowered.com/app/1055540/A_Short_Hike/", "4.8"]),
    ("1282730", &["https://store.steampowered.com/app/1282730/Loop_Hero/", "4.4"]),
    ("rgpub.io", &["https://playvalorant.com/", "4.1"]),
    ("210970", &["https://store.steampowered.com/app/210970/The_Witness/", "4.3"]),
    ("383870", &["https://store.steampowered.com/app/383870/Firewatch/", "4.5"]),
    ("1426210", &["https://store.steampowered.com/app/1426210/It_Takes_Two/", "4.9"]),
    ("728880", &["https://store.steampowered.com/app/728880/Overcooked_2/", "4.6"]),
    ("/620/", &["https://store.steampowered.com/app/620/Portal_2/", "4.9"]),
    ("341800", &["https://store.steampowered.com/app/341800/Keep_Talking_and_Nobody_Explodes/", "4.5"]),
    ("264710", &["https://store.steampowered.com/app/264710/Subnautica/", "4.7"]),
    ("632360", &["https://store.steampowered.com/app/632360/Risk_of_Rain_2/", "4.6"]),
    ("1057090", &["https://store.steampowered.com/app/1057090/Ori_and_the_Will_of_the_Wisps/", "4.8"]),
    ("2225070", &["https://www.trackmania.com/", "4.4"]),
    ("1097150", &["https://store.steampowered.com/app/1097150/Fall_Guys/", "3.9"]),
    ("chesscomfiles", &["https://www.chess.com/", "4.2"]),
    ("683320", &["https://store.steampowered.com/app/683320/GRIS/", "4.7"]),
    ("972660", &["https://store.steampowered.com/app/972660/Spiritfarer_Farewell_Edition/", "4.8"]),
    ("427520", &["https://store.steampowered.com/app/427520/Factorio/", "4.9"]),
    ("animal-crossing", &["https://www.nintendo.com/us/store/products/animal-crossing-new-horizons-switch/", "4.7"]),
    ("638230", &["https://store.steampowered.com/app/638230/Journey/", "4.8"]),
    ("945360", &["https://store.steampowered.com/app/945360/Among_Us/", "4.0"]),
    ("bnetcmsus", &["https://hearthstone.blizzard.com/", "4.1"]),
    ("1794680", &["https://store.steampowered.com/app/1794680/Vampire_Survivors/", "4.5"]),
    ("504230", &["https://store.steampowered.com/app/504230/Celeste/", "4.8"]),
    ("/730/", &["https://store.steampowered.com/app/730/CounterStrike_2/", "4.3"]),
];

const TITLES: &[(&str, &[&str])] = &[
    ("Unpacking", &["https://store.steampowered.com/app/1135690/Unpacking/"]),
    ("Dorfromantik", &["https://store.steampowered.com/app/1455840/Dorfromantik/"]),
    ("Tetris Effect", &["https://store.steampowered.com/app/1003590/Tetris_Effect_Connected/"]),
    ("Dead Cells", &["https://store.steampowered.com/app/588650/Dead_Cells/"]),
    ("Rocket League", &["https://store.steampowered.com/app/252950/Rocket_League/"]),
    ("Baba Is You", &["https://store.steampowered.com/app/736260/Baba_Is_You/"]),
    ("Hades", &["https://store.steampowered.com/app/1145360/Hades/"]),
    ("Stardew Valley", &["https://store.steampowered.com/app/413150/Stardew_Valley/"]),
    ("Slay the Spire", &["https://store.steampowered.com/app/646570/Slay_the_Spire/"]),
    ("Apex Legends", &["https://store.steampowered.com/app/1172470/Apex_Legends/", "4.2"]),
    ("PowerWash Simulator", &["https://store.steampowered.com/app/1290000/PowerWash_Simulator/", "4.7"]),
    ("Into the Breach", &["https://store.steampowered.com/app/590380/Into_the_Breach/", "4.6"]),
    ("The Witcher 3", &["https://store.steampowered.com/app/292030/The_Witcher_3_Wild_Hunt/", "4.9"]),
    ("Minecraft", &["https://www.minecraft.net/", "4.8"]),
    ("Dark Souls III", &["https://store.steampowered.com/app/374320/DARK_SOULS_III/", "4.7"]),
    ("Civilization VI", &["https://store.steampowered.com/app/289070/Sid_Meiers_Civilization_VI/", "4.5"]),
    ("A Short Hike", &["https://store.steampowered.com/app/1055540/A_Short_Hike/", "4.8"]),
    ("Loop Hero", &["https://store.steampowered.com/app/1282730/Loop_Hero/", "4.4"]),
    ("Valorant", &["https://playvalorant.com/", "4.1"]),
    ("The Witness", &["https://store.steampowered.com/app/210970/The_Witness/", "4.3"]),
    ("Firewatch", &["https://store.steampowered.com/app/383870/Firewatch/", "4.5"]),
    ("It Takes Two", &["https://store.steampowered.com/app/1426210/It_Takes_Two/", "4.9"]),
    ("Overcooked 2", &["https://store.steampowered.com/app/728880/Overcooked_2/", "4.6"]),
    ("Portal 2", &["https://store.steampowered.com/app/620/Portal_2/", "4.9"]),
    ("Keep Talking and Nobody Explodes", &["https://store.steampowered.com/app/341800/Keep_Talking_and_Nobody_Explodes/", "4.5"]),
    ("Subnautica", &["https://store.steampowered.com/app/264710/Subnautica/", "4.7"]),
    ("Risk of Rain 2", &["https://store.steampowered.com/app/632360/Risk_of_Rain_2/", "4.6"]),
    ("Ori and the Will of the Wisps", &["https://store.steampowered.com/app/1057090/Ori_and_the_Will_of_the_Wisps/", "4.8"]),
    ("Trackmania", &["https://www.trackmania.com/", "4.4"]),
    ("Fall Guys", &["https://store.steampowered.com/app/1097150/Fall_Guys/", "3.9"]),
    ("Chess Online", &["https://www.chess.com/", "4.2"]),
    ("Gris", &["https://store.steampowered.com/app/683320/GRIS/", "4.7"]),
    ("Spiritfarer", &["https://store.steampowered.com/app/972660/Spiritfarer_Farewell_Edition/", "4.8"]),
    ("Factorio", &["https://store.steampowered.com/app/427520/Factorio/", "4.9"]),
    ("Animal Crossing", &["https://www.nintendo.com/us/store/products/animal-crossing-new-horizons-switch/", "4.7"]),
    ("Journey", &["https://store.steampowered.com/app/638230/Journey/", "4.8"]),
    ("Among Us", &["https://store.steampowered.com/app/945360/Among_Us/", "4.0"]),
    ("Hearthstone", &["https://hearthstone.blizzard.com/", "4.1"]),
    ("Vampire Survivors", &["https://store.steampowered.com/app/1794680/Vampire_Survivors/", "4.5"]),
    ("Celeste", &["https://store.steampowered.com/app/504230/Celeste/", "4.8"]),
    ("Counter-Strike 2", &["https://store.steampowered.com/app/730/CounterStrike_2/", "4.3"]),
];

const POSITIONS: &[(&str, &[&str])] = &[
    ("3", &["https://store.steampowered.com/app/1003590/Tetris_Effect_Connected/"]),
    ("4", &["https://store.steampowered.com/app/588650/Dead_Cells/"]),
    ("5", &["https://store.steampowered.com/app/252950/Rocket_League/"]),
    ("6", &["https://store.steampowered.com/app/736260/Baba_Is_You/"]),
    ("7", &["https://store.steampowered.com/app/1145360/Hades/"]),
    ("8", &["https://store.steampowered.com/app/413150/Stardew_Valley/"]),
    ("9", &["https://store.steampowered.com/app/646570/Slay_the_Spire/"]),
    ("10", &["https://store.steampowered.com/app/1172470/Apex_Legends/"]),
    ("11", &["https://store.steampowered.com/app/1290000/PowerWash_Simulator/"]),
    ("12", &["https://store.steampowered.com/app/590380/Into_the_Breach/"]),
    ("13", &["https://store.steampowered.com/app/292030/The_Witcher_3_Wild_Hunt/"]),
    ("14", &["https://www.minecraft.net/"]),
    ("15", &["https://store.steampowered.com/app/374320/DARK_SOULS_III/"]),
    ("16", &["https://store.steampowered.com/app/289070/Sid_Meiers_Civilization_VI/"]),
    ("17", &["https://store.steampowered.com/app/1055540/A_Short_Hike/"]),
    ("18", &["https://store.steampowered.com/app/1282730/Loop_Hero/"]),
    ("19", &["https://playvalorant.com/"]),
    ("20", &["https://store.steampowered.com/app/210970/The_Witness/"]),
    ("21", &["https://store.steampowered.com/app/383870/Firewatch/"]),
    ("22", &["https://store.steampowered.com/app/1426210/It_Takes_Two/"]),
    ("23", &["https://store.steampowered.com/app/728880/Overcooked_2/"]),
    ("24", &["https://store.steampowered.com/app/620/Portal_2/"]),
    ("25", &["https://store.steampowered.com/app/341800/Keep_Talking_and_Nobody_Explodes/"]),
    ("26", &["https://store.steampowered.com/app/264710/Subnautica/"]),
    ("27", &["https://store.steampowered.com/app/632360/Risk_of_Rain_2/"]),
    ("28", &["https://store.steampowered.com/app/1057090/Ori_and_the_Will_of_the_Wisps/"]),
    ("29", &["https://www.trackmania.com/"]),
    ("30", &["https://store.steampowered.com/app/1097150/Fall_Guys/"]),
    ("31", &["https://www.chess.com/"]),
    ("32", &["https://store.steampowered.com/app/683320/GRIS/"]),
    ("33", &["https://store.steampowered.com/app/972660/Spiritfarer_Farewell_Edition/"]),
    ("34", &["https://store.steampowered.com/app/427520/Factorio/"]),
    ("35", &["https://www.nintendo.com/us/store/products/animal-crossing-new-horizons-switch/"]),
    ("36", &["https://store.steampowered.com/app/638230/Journey/"]),
    ("37", &["https://store.steampowered.com/app/945360/Among_Us/"]),
    ("38", &["https://hearthstone.blizzard.com/"]),
    ("39", &["https://store.steampowered.com/app/1794680/Vampire_Survivors/"]),
    ("40", &["https://store.steampowered.com/app/504230/Celeste/"]),
    ("41", &["https://store.steampowered.com/app/730/CounterStrike_2/"]),
];
