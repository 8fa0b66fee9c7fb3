use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::error::YapYapError;
use crate::injector::PageInjector;
use crate::messages::PageCommand;
use crate::page::Page;

/// Index of a tab within its host.
pub type TabId = usize;

/// Tab surface the popup talks to: which tab is active, navigation, and
/// one-shot command delivery. No response ever comes back.
#[async_trait]
pub trait TabHost: Send {
    fn active_tab(&self) -> Option<TabId>;
    async fn navigate(&mut self, tab: TabId, url: &str) -> Result<()>;
    async fn send(&mut self, tab: TabId, command: &PageCommand) -> Result<()>;
}

struct Tab {
    url: String,
    page: Page,
}

/// In-process tab host: each tab holds a page model, and commands are
/// applied straight through the injector.
#[derive(Default)]
pub struct LocalTabs {
    tabs: Vec<Tab>,
    active: Option<TabId>,
    injector: PageInjector,
}

impl LocalTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab at `url` with an empty page and make it active.
    pub fn open(&mut self, url: &str) -> TabId {
        self.tabs.push(Tab {
            url: url.to_string(),
            page: Page::new(),
        });
        let id = self.tabs.len() - 1;
        self.active = Some(id);
        id
    }

    pub fn activate(&mut self, tab: TabId) {
        if tab < self.tabs.len() {
            self.active = Some(tab);
        }
    }

    pub fn url(&self, tab: TabId) -> Option<&str> {
        self.tabs.get(tab).map(|t| t.url.as_str())
    }

    pub fn page(&self, tab: TabId) -> Option<&Page> {
        self.tabs.get(tab).map(|t| &t.page)
    }

    pub fn page_mut(&mut self, tab: TabId) -> Option<&mut Page> {
        self.tabs.get_mut(tab).map(|t| &mut t.page)
    }
}

#[async_trait]
impl TabHost for LocalTabs {
    fn active_tab(&self) -> Option<TabId> {
        self.active
    }

    async fn navigate(&mut self, tab: TabId, url: &str) -> Result<()> {
        let entry = self
            .tabs
            .get_mut(tab)
            .ok_or_else(|| YapYapError::Tab(format!("no tab {}", tab)))?;

        debug!("Navigating tab {} to {}", tab, url);
        entry.url = url.to_string();
        // A navigation always lands on a fresh page.
        entry.page = Page::new();
        Ok(())
    }

    async fn send(&mut self, tab: TabId, command: &PageCommand) -> Result<()> {
        let entry = self
            .tabs
            .get_mut(tab)
            .ok_or_else(|| YapYapError::Tab(format!("no tab {}", tab)))?;

        debug!("Delivering {:?} to tab {}", command, tab);
        self.injector.apply(&mut entry.page, command);
        Ok(())
    }
}
