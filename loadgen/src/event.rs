use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::category::CategoryStore;
use crate::time::TimeSource;

pub const CURRENCIES: [&str; 5] = ["FCFA", "USD", "CDF", "CFA", "EUR"];
pub const ACCOUNT_METHODS: [&str; 5] = ["phone", "facebook", "google", "email", "apple"];
pub const PAYMENT_METHODS: [&str; 6] = [
    "palpay",
    "mobile_money",
    "wave",
    "bank_card",
    "balance",
    "Western Union",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchProps {
    pub is_open: u8,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginProps {
    pub is_login: u8,
    pub login_method: String,
    pub user_name: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterProps {
    pub is_register: u8,
    pub user_name: String,
    pub register_method: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchProps {
    pub search_keyword: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProps {
    pub offer_id: u64,
    pub category_id: i64,
    pub price: f64,
    pub currency: String,
    pub timestamp: String,
    pub product_name: String,
    pub product_img: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProps {
    pub category_id: i64,
    pub timestamp: String,
    pub category_name: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListProps {
    pub category_id: i64,
    pub category_name: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemProps {
    pub offer_id: u64,
    pub category_id: i64,
    pub price: f64,
    pub quantity: u8,
    pub currency: String,
    pub timestamp: String,
    pub product_name: String,
    pub product_img: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProps {
    pub payment_method: String,
    pub online: u8,
    pub all_price: f64,
    pub currency: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProps {
    pub order_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutProps {
    pub is_suc: u8,
    pub all_price: f64,
    pub currency: String,
    pub timestamp: String,
    pub shipping_method: u8,
    pub shipping_price_outside: u8,
    pub shipping_price_within: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseProps {
    pub order_id: String,
    pub is_suc: u8,
    pub timestamp: String,
}

/// The twelve event shapes, tagged by `event_name` on the wire. Adding a
/// thirteenth means the compiler walks you through every match below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_name")]
pub enum EventPayload {
    #[serde(rename = "launch")]
    Launch { event_properties: Vec<LaunchProps> },
    #[serde(rename = "login")]
    Login { event_properties: Vec<LoginProps> },
    #[serde(rename = "register")]
    Register {
        event_properties: Vec<RegisterProps>,
    },
    #[serde(rename = "search")]
    Search { event_properties: Vec<SearchProps> },
    #[serde(rename = "product")]
    Product { event_properties: Vec<ProductProps> },
    #[serde(rename = "category")]
    Category {
        event_properties: Vec<CategoryProps>,
    },
    #[serde(rename = "productList")]
    ProductList {
        event_properties: Vec<ProductListProps>,
    },
    #[serde(rename = "addToCart")]
    AddToCart {
        event_properties: Vec<CartItemProps>,
    },
    #[serde(rename = "payment")]
    Payment { event_properties: Vec<PaymentProps> },
    #[serde(rename = "order")]
    Order { event_properties: Vec<OrderProps> },
    #[serde(rename = "checkout")]
    Checkout {
        event_properties: Vec<CheckoutProps>,
    },
    #[serde(rename = "purchase")]
    Purchase {
        event_properties: Vec<PurchaseProps>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub payload: EventPayload,
    // Serialized as an explicit null for launch events
    #[serde(default)]
    pub page_name: Option<String>,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self.payload {
            EventPayload::Launch { .. } => "launch",
            EventPayload::Login { .. } => "login",
            EventPayload::Register { .. } => "register",
            EventPayload::Search { .. } => "search",
            EventPayload::Product { .. } => "product",
            EventPayload::Category { .. } => "category",
            EventPayload::ProductList { .. } => "productList",
            EventPayload::AddToCart { .. } => "addToCart",
            EventPayload::Payment { .. } => "payment",
            EventPayload::Order { .. } => "order",
            EventPayload::Checkout { .. } => "checkout",
            EventPayload::Purchase { .. } => "purchase",
        }
    }

    pub fn properties_len(&self) -> usize {
        match &self.payload {
            EventPayload::Launch { event_properties } => event_properties.len(),
            EventPayload::Login { event_properties } => event_properties.len(),
            EventPayload::Register { event_properties } => event_properties.len(),
            EventPayload::Search { event_properties } => event_properties.len(),
            EventPayload::Product { event_properties } => event_properties.len(),
            EventPayload::Category { event_properties } => event_properties.len(),
            EventPayload::ProductList { event_properties } => event_properties.len(),
            EventPayload::AddToCart { event_properties } => event_properties.len(),
            EventPayload::Payment { event_properties } => event_properties.len(),
            EventPayload::Order { event_properties } => event_properties.len(),
            EventPayload::Checkout { event_properties } => event_properties.len(),
            EventPayload::Purchase { event_properties } => event_properties.len(),
        }
    }
}

/// Produces one fully-formed event of a randomly chosen variant. Generation
/// cannot fail: the category store is non-empty by construction and every
/// sampled domain is closed.
pub struct EventFactory {
    categories: Arc<CategoryStore>,
    time: Arc<dyn TimeSource + Send + Sync>,
}

impl EventFactory {
    pub fn new(
        categories: Arc<CategoryStore>,
        time: Arc<dyn TimeSource + Send + Sync>,
    ) -> EventFactory {
        EventFactory { categories, time }
    }

    /// Uniform over the twelve variants.
    pub fn generate(&self, rng: &mut impl Rng) -> Event {
        match rng.gen_range(0..12) {
            0 => self.launch(rng),
            1 => self.login(rng),
            2 => self.register(rng),
            3 => self.search(rng),
            4 => self.product(rng),
            5 => self.category(rng),
            6 => self.product_list(rng),
            7 => self.add_to_cart(rng),
            8 => self.payment(rng),
            9 => self.order(rng),
            10 => self.checkout(rng),
            _ => self.purchase(rng),
        }
    }

    pub fn launch(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Launch {
                event_properties: vec![LaunchProps {
                    is_open: flag(rng),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: None,
        }
    }

    pub fn login(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Login {
                event_properties: vec![LoginProps {
                    is_login: 1,
                    login_method: choose(rng, &ACCOUNT_METHODS),
                    user_name: ten_digits(rng),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("login")),
        }
    }

    pub fn register(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Register {
                event_properties: vec![RegisterProps {
                    is_register: 1,
                    user_name: ten_digits(rng),
                    register_method: choose(rng, &ACCOUNT_METHODS),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("register")),
        }
    }

    pub fn search(&self, rng: &mut impl Rng) -> Event {
        let category = self.categories.pick(rng);
        Event {
            payload: EventPayload::Search {
                event_properties: vec![SearchProps {
                    search_keyword: category.category_name.clone(),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("search")),
        }
    }

    pub fn product(&self, rng: &mut impl Rng) -> Event {
        let category = self.categories.pick(rng);
        Event {
            payload: EventPayload::Product {
                event_properties: vec![ProductProps {
                    offer_id: offer_id(rng),
                    category_id: category.category_id,
                    price: price(rng, 1, 1_000),
                    currency: choose(rng, &CURRENCIES),
                    timestamp: self.time.current_time(),
                    product_name: category.category_name.clone(),
                    product_img: product_img(rng),
                }],
            },
            page_name: Some(String::from("product")),
        }
    }

    pub fn category(&self, rng: &mut impl Rng) -> Event {
        let category = self.categories.pick(rng);
        Event {
            payload: EventPayload::Category {
                event_properties: vec![CategoryProps {
                    category_id: category.category_id,
                    timestamp: self.time.current_time(),
                    category_name: category.category_name.clone(),
                    level: rng.gen_range(1..=3),
                }],
            },
            page_name: Some(String::from("category")),
        }
    }

    pub fn product_list(&self, rng: &mut impl Rng) -> Event {
        let category = self.categories.pick(rng);
        Event {
            payload: EventPayload::ProductList {
                event_properties: vec![ProductListProps {
                    category_id: category.category_id,
                    category_name: category.category_name.clone(),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("productList")),
        }
    }

    /// 1-3 cart items sharing one category, the way a real cart add does.
    pub fn add_to_cart(&self, rng: &mut impl Rng) -> Event {
        let category = self.categories.pick(rng);
        let items = (0..rng.gen_range(1..=3))
            .map(|_| CartItemProps {
                offer_id: offer_id(rng),
                category_id: category.category_id,
                price: price(rng, 1, 100),
                quantity: rng.gen_range(1..=5),
                currency: choose(rng, &CURRENCIES),
                timestamp: self.time.current_time(),
                product_name: category.category_name.clone(),
                product_img: product_img(rng),
            })
            .collect();

        Event {
            payload: EventPayload::AddToCart {
                event_properties: items,
            },
            page_name: Some(String::from("addToCart")),
        }
    }

    pub fn payment(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Payment {
                event_properties: vec![PaymentProps {
                    payment_method: choose(rng, &PAYMENT_METHODS),
                    online: flag(rng),
                    all_price: price(rng, 10, 1_000),
                    currency: choose(rng, &CURRENCIES),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("payment")),
        }
    }

    pub fn order(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Order {
                event_properties: vec![OrderProps {
                    order_id: ten_digits(rng),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("order")),
        }
    }

    pub fn checkout(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Checkout {
                event_properties: vec![CheckoutProps {
                    is_suc: flag(rng),
                    all_price: price(rng, 10, 1_000),
                    currency: choose(rng, &CURRENCIES),
                    timestamp: self.time.current_time(),
                    shipping_method: flag(rng),
                    shipping_price_outside: rng.gen_range(20..=60),
                    shipping_price_within: rng.gen_range(10..=30),
                }],
            },
            page_name: Some(String::from("checkout")),
        }
    }

    pub fn purchase(&self, rng: &mut impl Rng) -> Event {
        Event {
            payload: EventPayload::Purchase {
                event_properties: vec![PurchaseProps {
                    order_id: ten_digits(rng),
                    is_suc: flag(rng),
                    timestamp: self.time.current_time(),
                }],
            },
            page_name: Some(String::from("purchase")),
        }
    }
}

fn flag(rng: &mut impl Rng) -> u8 {
    rng.gen_range(0..=1)
}

fn choose(rng: &mut impl Rng, values: &[&str]) -> String {
    values
        .choose(rng)
        .map(|value| String::from(*value))
        .unwrap_or_default()
}

/// Sampled in whole cents so prices carry at most two decimals.
fn price(rng: &mut impl Rng, min: u64, max: u64) -> f64 {
    rng.gen_range(min * 100..=max * 100) as f64 / 100.0
}

fn ten_digits(rng: &mut impl Rng) -> String {
    rng.gen_range(1_000_000_000u64..=9_999_999_999).to_string()
}

fn offer_id(rng: &mut impl Rng) -> u64 {
    rng.gen_range(100_000_000_000u64..=999_999_999_999)
}

fn product_img(rng: &mut impl Rng) -> String {
    format!("https://example.com/img/{}.jpg", rng.gen_range(1_000..=9_999))
}
