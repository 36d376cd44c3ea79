//! The UI property bins that carry anchored HUD layouts.

use std::collections::HashMap;

use crate::hash;

/// Entry paths of every UI bin the patcher rewrites.
pub const UI_BIN_PATHS: &[&str] = &[
    // render UI
    "ux/renderui/default/basedata.bin",
    "ux/renderui/default_basedata_scenes.bin",
    "ux/renderui/default_renderui.bin",
    "ux/renderui/scenes/default/basedata.bin",
    "ux/renderui/scenes/default/sb_hexakill_ltor_nonames.bin",
    "ux/renderui/scenes/default/sb_hexakill_mirroredcenter_names.bin",
    "ux/renderui/scenes/default/sb_hexakill_mirroredcenter_nonames.bin",
    "ux/renderui/scenes/shared/basedata.bin",
    "ux/renderui/scenes/shared/mobileshared.bin",
    "ux/renderui/scenes/spectatorupdate/basedata.bin",
    "ux/renderui/scenes/tft/basedata.bin",
    "ux/renderui/scenes/tft/mobile.bin",
    "ux/renderui/shared/basedata.bin",
    "ux/renderui/shared_renderui.bin",
    "ux/renderui/spectatorupdate/basedata.bin",
    "ux/renderui/spectatorupdate_basedata_scenes.bin",
    "ux/renderui/spectatorupdate_renderui.bin",
    "ux/renderui/supplementarybins/shared/loadingscreen.bin",
    "ux/renderui/supplementarybins/shared/loadingscreen_clash.bin",
    "ux/renderui/tft/basedata.bin",
    "ux/renderui/tft_renderui.bin",
    // ui base
    "common/candidatelist.uibase.bin",
    "common/keywords.uibase.bin",
    "common/messageboxdialog.uibase.bin",
    "common/options.uibase.bin",
    "common/richbackground.uibase.bin",
    "common/tooltips.uibase.bin",
    "gameplay.questtrackers.uibase.bin",
    "gameplay/chat.uibase.bin",
    "gameplay/deathrecap.uibase.bin",
    "gameplay/endofgame.uibase.bin",
    "gameplay/enemyrespawntimers.uibase.bin",
    "gameplay/esportsbroadcasthud.uibase.bin",
    "gameplay/floatinginfobars.uibase.bin",
    "gameplay/itemshop.uibase.bin",
    "gameplay/killcallouts.uibase.bin",
    "gameplay/lolemotes.uibase.bin",
    "gameplay/lolfloatinginfobars.uibase.bin",
    "gameplay/lolgameheader.uibase.bin",
    "gameplay/lolminimap.uibase.bin",
    "gameplay/lolobjectivebanner.uibase.bin",
    "gameplay/lolprogressbars.uibase.bin",
    "gameplay/missfortuneskin31viewcontroller.uibase.bin",
    "gameplay/pausedialog.uibase.bin",
    "gameplay/playerframe.uibase.bin",
    "gameplay/playerinventory.uibase.bin",
    "gameplay/playerperks.uibase.bin",
    "gameplay/playerstats.uibase.bin",
    "gameplay/playerstatstones.uibase.bin",
    "gameplay/practicetool.uibase.bin",
    "gameplay/questtrackers.uibase.bin",
    "gameplay/reconnectdialog.uibase.bin",
    "gameplay/replaycameracontrols.uibase.bin",
    "gameplay/replaycontrols.uibase.bin",
    "gameplay/replayvisibilitymenu.uibase.bin",
    "gameplay/scoreboard.uibase.bin",
    "gameplay/spectatorkillcallouts.uibase.bin",
    "gameplay/spectatorscoreboard.uibase.bin",
    "gameplay/spellpickchoice.uibase.bin",
    "gameplay/statstonemilestonecallout.uibase.bin",
    "gameplay/surrender.uibase.bin",
    "gameplay/targetframe.uibase.bin",
    "gameplay/targetframereplay.uibase.bin",
    "gameplay/teamfightreplay.uibase.bin",
    "gameplay/teamframes.uibase.bin",
    "gameplay/teamframesreplay.uibase.bin",
    "gameplay/tftarmory.uibase.bin",
    "gameplay/tftarmory_assists.uibase.bin",
    "gameplay/tftarmory_augments.uibase.bin",
    "gameplay/tftcombatrecap.uibase.bin",
    "gameplay/tftfloatinginfobars.uibase.bin",
    "gameplay/tftgameheader.uibase.bin",
    "gameplay/tftgamestart.uibase.bin",
    "gameplay/tftitemcodex.uibase.bin",
    "gameplay/tftminimap.uibase.bin",
    "gameplay/tftobjectivebanner.uibase.bin",
    "gameplay/tftscoreboard.uibase.bin",
    "gameplay/tftstage.uibase.bin",
    "gameplay/tftsurrender.uibase.bin",
    "gameplay/tfttraitinfocard.uibase.bin",
    "gameplay/tfttraittracker.uibase.bin",
    "gameplay/tftunitinfo.uibase.bin",
    "gameplay/tftunitshop.uibase.bin",
    "gameplay/tiptracker.uibase.bin",
    "gameplay/voicechat.uibase.bin",
    "loadingscreen/loadingscreenclassic.uibase.bin",
    "loadingscreen/loadingscreentutorial.uibase.bin",
    "loadingscreen/playercardsclassic.uibase.bin",
];

/// A set of entry path hashes with the paths they were built from.
///
/// Built once per run and shared by reference; lookups never allocate.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    names: HashMap<u64, String>,
}

impl FileTable {
    /// Hashes every path with [`hash::xxh64`].
    pub fn new<S: AsRef<str>>(paths: impl IntoIterator<Item = S>) -> Self {
        let mut table = Self::default();
        for path in paths {
            let path = path.as_ref();
            let path_hash = hash::xxh64(path);
            table.names.entry(path_hash).or_insert_with(|| path.to_owned());
        }
        table
    }

    /// The table of [`UI_BIN_PATHS`].
    pub fn ui_bins() -> Self {
        Self::new(UI_BIN_PATHS.iter().copied())
    }

    /// Returns `true` if the hash is in the table.
    pub fn contains(&self, path_hash: u64) -> bool {
        self.names.contains_key(&path_hash)
    }

    /// Returns the path a hash was built from.
    pub fn name(&self, path_hash: u64) -> Option<&str> {
        self.names.get(&path_hash).map(String::as_str)
    }

    /// Number of distinct hashes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
