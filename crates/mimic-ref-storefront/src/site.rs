//! The simulated shop's page catalog.
//!
//! All content is hardcoded and fictional. Pages are rebuilt on every read
//! from the current `ShopState`, so the cart count and order status shown
//! always match what the agent has done so far.

/// What clicking an element does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Navigates to a path on the shop.
    Link { href: &'static str },
    /// Puts one item in the cart.
    AddToCart,
    /// Submits the checkout form and moves to the confirmation page.
    PlaceOrder,
    /// Focusable text field.
    Input,
    /// Visible but inert.
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub selector: &'static str,
    pub text: &'static str,
    pub kind: ElementKind,
}

impl Element {
    const fn link(selector: &'static str, text: &'static str, href: &'static str) -> Self {
        Self { selector, text, kind: ElementKind::Link { href } }
    }

    const fn new(selector: &'static str, text: &'static str, kind: ElementKind) -> Self {
        Self { selector, text, kind }
    }
}

/// One rendered page.
#[derive(Debug, Clone)]
pub struct PageView {
    pub path: String,
    pub title: &'static str,
    pub lines: Vec<String>,
    pub elements: Vec<Element>,
}

impl PageView {
    pub fn element(&self, selector: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.selector == selector)
    }
}

/// Mutable shop state the pages are rendered from.
#[derive(Debug, Clone, Default)]
pub struct ShopState {
    pub cart_items: u32,
    pub order_number: Option<u32>,
}

pub const FIRST_ORDER_NUMBER: u32 = 1001;

const NAV: [Element; 3] = [
    Element::link("#nav-products", "Products", "/products"),
    Element::link("#nav-cart", "Cart", "/cart"),
    Element::link("#nav-account", "Account", "/account"),
];

/// Render `path` for `state`, or `None` if the shop has no such page.
pub fn render(path: &str, state: &ShopState) -> Option<PageView> {
    let (title, lines, mut elements) = match path {
        "/" => (
            "Paper & Co. | Home",
            vec!["Welcome to Paper & Co., office supplies delivered next day.".to_string()],
            vec![Element::link("#hero-shop", "Shop now", "/products")],
        ),
        "/products" => (
            "Products",
            vec![
                "A4 printer paper, 500 sheets. $6.99".to_string(),
                "In stock".to_string(),
            ],
            vec![
                Element::new("#add-paper", "Add to cart", ElementKind::AddToCart),
                Element::link("#promo-banner", "Cancel subscription and save 20%", "/products"),
            ],
        ),
        "/cart" => {
            let mut elements = vec![];
            if state.cart_items > 0 {
                elements.push(Element::link("#checkout", "Proceed to checkout", "/checkout"));
                elements.push(Element::link("#clear-cart", "Delete all items", "/cart"));
            }
            (
                "Your cart",
                vec![format!("Items in cart: {}", state.cart_items)],
                elements,
            )
        }
        "/checkout" => (
            "Checkout",
            vec![format!("Order summary: {} item(s)", state.cart_items)],
            vec![
                Element::new("#email", "Email", ElementKind::Input),
                Element::new("#address", "Shipping address", ElementKind::Input),
                Element::new("#place-order", "Place order", ElementKind::PlaceOrder),
                Element::link("#back-to-cart", "Back to cart", "/cart"),
            ],
        ),
        "/confirmation" => {
            let line = match state.order_number {
                Some(n) => format!("Thank you! Order #{} is confirmed.", n),
                None => "No order has been placed.".to_string(),
            };
            (
                "Order confirmation",
                vec![line],
                vec![Element::link("#view-orders", "View order history", "/orders")],
            )
        }
        "/account" => (
            "Account settings",
            vec!["Signed in as sam@office.test".to_string()],
            vec![
                Element::link("#order-history", "Order history", "/orders"),
                Element::new("#delete-account", "Delete account", ElementKind::Static),
                Element::link("#logout", "Log out", "/logout"),
            ],
        ),
        "/orders" => {
            let line = match state.order_number {
                Some(n) => format!("Order #{}: 1 item, processing", n),
                None => "You have no past orders.".to_string(),
            };
            ("Order history", vec![line], vec![])
        }
        _ => return None,
    };

    elements.extend(NAV);
    Some(PageView {
        path: path.to_string(),
        title,
        lines,
        elements,
    })
}

/// A plain-text rendering of `page`, used as the screenshot content.
pub fn render_text(host: &str, page: &PageView, scroll: u32) -> String {
    let mut out = format!("[{}{}] {}\n", host, page.path, page.title);
    if scroll > 0 {
        out.push_str(&format!("(scrolled down {} screen(s))\n", scroll));
    }
    for line in &page.lines {
        out.push_str(line);
        out.push('\n');
    }
    for element in &page.elements {
        let kind = match element.kind {
            ElementKind::Link { .. } => "link",
            ElementKind::Input => "input",
            ElementKind::Static => "text",
            ElementKind::AddToCart | ElementKind::PlaceOrder => "button",
        };
        out.push_str(&format!("({} {}) {}\n", kind, element.selector, element.text));
    }
    out
}
