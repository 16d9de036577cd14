use crate::book_file::BookSelection;
use crate::detail::BookDetail;
use crate::model::{ManualEntryForm, StatusBanner};
use crate::preview::UploadSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Qa,
    Books,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QaTab {
    #[default]
    Manual,
    Bulk,
}

/// UI state of the contribute page. Only one mode is interactable at a time.
///
/// Every mode or tab switch drops the banner; leaving a mode or tab also
/// drops the transient file selection that belonged to it.
#[derive(Debug, Clone, Default)]
pub struct ContributeView {
    mode: Mode,
    tab: QaTab,
    banner: Option<StatusBanner>,
    pub form: ManualEntryForm,
    pub dataset: Option<UploadSelection>,
    pub book: Option<BookSelection>,
    pub skip_ocr: bool,
    pub book_search: String,
    pub detail: Option<BookDetail>,
}

impl ContributeView {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tab(&self) -> QaTab {
        self.tab
    }

    pub fn banner(&self) -> Option<&StatusBanner> {
        self.banner.as_ref()
    }

    pub fn set_banner(&mut self, banner: StatusBanner) {
        self.banner = Some(banner);
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// Returns the mode that was active before the switch.
    pub fn switch_mode(&mut self, mode: Mode) -> Mode {
        let previous = self.mode;
        self.banner = None;
        if previous != mode {
            match previous {
                Mode::Qa => self.dataset = None,
                Mode::Books => {
                    self.book = None;
                    self.detail = None;
                }
            }
        }
        self.mode = mode;
        previous
    }

    pub fn switch_tab(&mut self, tab: QaTab) {
        self.banner = None;
        if self.tab == QaTab::Bulk && tab != QaTab::Bulk {
            self.dataset = None;
        }
        self.tab = tab;
    }
}
