//! `Storefront`: a simulated web shop implementing `PageDriver`.
//!
//! The storefront keeps one tab's worth of state (path, scroll, cart, form
//! inputs) behind a `Mutex`. Screenshots are plain-text renderings encoded
//! as base64, which `ScriptedRouter` decodes back into screen descriptions.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;
use url::Url;

use mimic_contracts::{
    action::{Action, ScrollDirection},
    error::{MimicError, MimicResult},
    execution::Screenshot,
};
use mimic_core::traits::{ElementTextReader, PageDriver};

use crate::site::{render, render_text, ElementKind, PageView, ShopState, FIRST_ORDER_NUMBER};

/// Origin the simulated shop is served from.
pub const BASE_URL: &str = "https://shop.example.com";
pub const HOST: &str = "shop.example.com";

#[derive(Debug)]
struct Tab {
    path: String,
    scroll: u32,
    shop: ShopState,
    inputs: HashMap<String, String>,
    executed: Vec<Action>,
}

/// A simulated storefront tab.
#[derive(Debug)]
pub struct Storefront {
    tab: Mutex<Tab>,
    /// Elements whose text cannot be read and whose clicks fail.
    flaky: HashSet<String>,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}

impl Storefront {
    /// A fresh tab on `about:blank`; the agent loop navigates first.
    pub fn new() -> Self {
        Self {
            tab: Mutex::new(Tab {
                path: String::new(),
                scroll: 0,
                shop: ShopState::default(),
                inputs: HashMap::new(),
                executed: Vec::new(),
            }),
            flaky: HashSet::new(),
        }
    }

    /// Mark `selector` as detached: unreadable, and failing when clicked.
    pub fn with_flaky(mut self, selector: &str) -> Self {
        self.flaky.insert(selector.to_string());
        self
    }

    fn tab(&self) -> MutexGuard<'_, Tab> {
        self.tab.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current_path(&self) -> String {
        self.tab().path.clone()
    }

    pub fn cart_items(&self) -> u32 {
        self.tab().shop.cart_items
    }

    pub fn order_number(&self) -> Option<u32> {
        self.tab().shop.order_number
    }

    pub fn input_value(&self, selector: &str) -> Option<String> {
        self.tab().inputs.get(selector).cloned()
    }

    /// Every action that reached `execute`, successful or not.
    pub fn executed(&self) -> Vec<Action> {
        self.tab().executed.clone()
    }

    fn current_page(tab: &Tab) -> MimicResult<PageView> {
        render(&tab.path, &tab.shop).ok_or_else(|| MimicError::Page {
            reason: format!("no page loaded at '{}'", tab.path),
        })
    }

    /// Resolve a navigation target to a shop path.
    fn resolve_path(target: &str) -> Result<String, String> {
        let base = Url::parse(BASE_URL).map_err(|e| e.to_string())?;
        let url = base.join(target).map_err(|e| format!("invalid URL '{}': {}", target, e))?;
        if url.host_str() != Some(HOST) {
            return Err(format!(
                "cannot reach host '{}'",
                url.host_str().unwrap_or_default()
            ));
        }
        Ok(url.path().to_string())
    }

    fn go_to(tab: &mut Tab, path: String) -> Result<(), String> {
        if render(&path, &tab.shop).is_none() {
            return Err(format!("404 Not Found: {}", path));
        }
        debug!(from = %tab.path, to = %path, "storefront navigation");
        tab.path = path;
        tab.scroll = 0;
        Ok(())
    }

    fn apply(&self, tab: &mut Tab, action: &Action) -> Result<(), String> {
        match action {
            Action::Navigate { url } => {
                let path = Self::resolve_path(url)?;
                Self::go_to(tab, path)
            }
            Action::Click { selector } => {
                let page = Self::current_page(tab).map_err(|e| e.to_string())?;
                let element = page
                    .element(selector)
                    .ok_or_else(|| format!("no element matches '{}'", selector))?;
                if self.flaky.contains(selector.as_str()) {
                    return Err("element is not attached to the page".to_string());
                }
                match element.kind {
                    ElementKind::Link { href } => Self::go_to(tab, href.to_string()),
                    ElementKind::AddToCart => {
                        tab.shop.cart_items += 1;
                        Ok(())
                    }
                    ElementKind::PlaceOrder => {
                        if tab.shop.cart_items == 0 {
                            return Err("cart is empty".to_string());
                        }
                        tab.shop.order_number = Some(FIRST_ORDER_NUMBER);
                        tab.shop.cart_items = 0;
                        Self::go_to(tab, "/confirmation".to_string())
                    }
                    ElementKind::Input | ElementKind::Static => Ok(()),
                }
            }
            Action::Type { selector, text } => {
                let page = Self::current_page(tab).map_err(|e| e.to_string())?;
                match page.element(selector).map(|e| &e.kind) {
                    Some(ElementKind::Input) => {
                        tab.inputs.insert(selector.clone(), text.clone());
                        Ok(())
                    }
                    Some(_) => Err(format!("'{}' is not an input", selector)),
                    None => Err(format!("no element matches '{}'", selector)),
                }
            }
            Action::Scroll { direction } => {
                tab.scroll = match direction {
                    ScrollDirection::Down => tab.scroll + 1,
                    ScrollDirection::Up => tab.scroll.saturating_sub(1),
                };
                Ok(())
            }
            // Simulated time: the page never changes on its own.
            Action::Wait { .. } => Ok(()),
            Action::Done { .. } | Action::Blocked { .. } => {
                Err("terminal decisions cannot be executed".to_string())
            }
        }
    }
}

#[async_trait]
impl ElementTextReader for Storefront {
    async fn read_element_text(&self, selector: &str) -> MimicResult<String> {
        let unreadable = |reason: &str| MimicError::ElementUnreadable {
            selector: selector.to_string(),
            reason: reason.to_string(),
        };
        if self.flaky.contains(selector) {
            return Err(unreadable("element detached while reading"));
        }
        let tab = self.tab();
        let page = Self::current_page(&tab).map_err(|e| unreadable(&e.to_string()))?;
        page.element(selector)
            .map(|e| e.text.to_string())
            .ok_or_else(|| unreadable("no element matches"))
    }
}

#[async_trait]
impl PageDriver for Storefront {
    async fn current_url(&self) -> MimicResult<String> {
        Ok(format!("{}{}", BASE_URL, self.tab().path))
    }

    async fn capture_screenshot(&self, step: u32) -> MimicResult<Screenshot> {
        let tab = self.tab();
        let page = Self::current_page(&tab)?;
        let text = render_text(HOST, &page, tab.scroll);
        Ok(Screenshot {
            reference: Screenshot::reference_for(step),
            encoded: STANDARD.encode(text),
        })
    }

    async fn execute(&self, action: &Action) -> MimicResult<()> {
        let mut tab = self.tab();
        tab.executed.push(action.clone());
        self.apply(&mut tab, action)
            .map_err(|reason| MimicError::ActionExecution {
                action: action.to_string(),
                reason,
            })
    }

    async fn wait_for_settle(&self, _timeout: Duration) {}
}
