use iced::widget::{
    button, column, container, horizontal_space, pick_list, row, scrollable, text, text_input,
    Column, Row,
};
use iced::{Alignment, Element, Length, Task};

use super::{alert, alert_error, card, empty_state, loading, DANGER, MUTED};
use crate::api::ApiClient;
use crate::error::Error;
use crate::state::data::{NewProduct, Product, PRODUCT_UNITS};
use crate::state::sequence::{RequestSequence, Ticket};

const PER_ROW: usize = 3;

/// Inventory of salon products
pub struct Stock {
    api: ApiClient,
    products: Vec<Product>,
    requests: RequestSequence,
    loading: bool,

    name: String,
    quantity: String,
    unit: &'static str,
    saving: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Ticket, Result<Vec<Product>, Error>),
    NameChanged(String),
    QuantityChanged(String),
    UnitSelected(&'static str),
    Create,
    Created(Result<Product, Error>),
    UseOne(i64),
    Used(i64, Result<Product, Error>),
}

/// An empty field counts as zero
fn parse_quantity(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Some(0);
    }
    input.parse().ok()
}

impl Stock {
    /// Create the screen with an empty form and start loading products
    pub fn new(api: ApiClient) -> (Self, Task<Message>) {
        let mut stock = Stock {
            api,
            products: Vec::new(),
            requests: RequestSequence::new(),
            loading: false,
            name: String::new(),
            quantity: String::from("0"),
            unit: PRODUCT_UNITS[0],
            saving: false,
        };
        let task = stock.refresh();
        (stock, task)
    }

    /// Refetch the product list
    fn refresh(&mut self) -> Task<Message> {
        let ticket = self.requests.next();
        let api = self.api.clone();
        self.loading = true;

        Task::perform(async move { api.products().await }, move |result| {
            Message::Loaded(ticket, result)
        })
    }

    /// Back to an empty name, zero quantity and the first unit
    fn reset_form(&mut self) {
        self.name.clear();
        self.quantity = String::from("0");
        self.unit = PRODUCT_UNITS[0];
    }

    /// The product to create, if the form is valid
    fn new_product(&self) -> Option<NewProduct> {
        let product = NewProduct {
            name: self.name.trim().to_string(),
            quantity: parse_quantity(&self.quantity)?,
            unit: self.unit.to_string(),
        };

        product.is_valid().then_some(product)
    }

    /// Handle form input, product creation and usage
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(ticket, result) => {
                if !self.requests.is_current(ticket) {
                    return Task::none();
                }

                self.loading = false;
                match result {
                    Ok(products) => self.products = products,
                    Err(e) => tracing::error!("could not load products: {}", e),
                }
                Task::none()
            }
            Message::NameChanged(name) => {
                self.name = name;
                Task::none()
            }
            Message::QuantityChanged(quantity) => {
                self.quantity = quantity;
                Task::none()
            }
            Message::UnitSelected(unit) => {
                self.unit = unit;
                Task::none()
            }
            Message::Create => {
                if self.saving {
                    return Task::none();
                }

                let Some(product) = self.new_product() else {
                    alert("Fill in the name and a valid quantity.");
                    return Task::none();
                };

                self.saving = true;
                let api = self.api.clone();
                Task::perform(
                    async move { api.create_product(&product).await },
                    Message::Created,
                )
            }
            Message::Created(result) => {
                self.saving = false;

                match result {
                    Ok(product) => {
                        tracing::info!("added product #{} {}", product.id, product.name);
                        alert("Product added!");
                        // Refetch so the list shows the stored product
                        self.reset_form();
                        self.refresh()
                    }
                    Err(e) => {
                        alert_error(&e, "Could not add the product.");
                        Task::none()
                    }
                }
            }
            Message::UseOne(id) => {
                let api = self.api.clone();
                Task::perform(async move { api.use_product(id, 1).await }, move |result| {
                    Message::Used(id, result)
                })
            }
            Message::Used(id, result) => match result {
                // The backend refuses to go below zero
                Ok(product) => {
                    tracing::debug!("product #{} down to {} {}", id, product.quantity, product.unit);
                    self.refresh()
                }
                Err(e) => {
                    alert_error(&e, "Could not take the product out of stock.");
                    Task::none()
                }
            },
        }
    }

    /// Add form on top, product cards below
    pub fn view(&self) -> Element<Message> {
        let form = card(
            column![
                text("Add a product").size(20),
                row![
                    column![
                        text("Product name"),
                        text_input("e.g. Professional shampoo 5L", &self.name)
                            .on_input(Message::NameChanged)
                            .on_submit(Message::Create)
                            .padding(10),
                    ]
                    .spacing(6)
                    .width(Length::FillPortion(3)),
                    column![
                        text("Quantity"),
                        text_input("0", &self.quantity)
                            .on_input(Message::QuantityChanged)
                            .on_submit(Message::Create)
                            .padding(10),
                    ]
                    .spacing(6)
                    .width(Length::FillPortion(1)),
                    column![
                        text("Unit"),
                        pick_list(PRODUCT_UNITS, Some(self.unit), Message::UnitSelected)
                            .padding(10)
                            .width(Length::Fill),
                    ]
                    .spacing(6)
                    .width(Length::FillPortion(1)),
                    button(text(if self.saving { "Adding..." } else { "Add" }))
                        .on_press_maybe((!self.saving).then_some(Message::Create))
                        .style(button::success)
                        .padding(10),
                ]
                .spacing(12)
                .align_y(Alignment::End),
            ]
            .spacing(16),
        );

        let products: Element<Message> = if self.loading && self.products.is_empty() {
            card(loading())
        } else if self.products.is_empty() {
            card(empty_state(
                "No products yet",
                "Add products to keep track of the stock",
            ))
        } else {
            self.products
                .chunks(PER_ROW)
                .fold(Column::new().spacing(12), |grid, chunk| {
                    let line = chunk
                        .iter()
                        .fold(Row::new().spacing(12), |line, p| line.push(view_product(p)));
                    grid.push(line)
                })
                .into()
        };

        scrollable(column![text("Stock").size(26), form, products].spacing(20)).into()
    }
}

/// Card with quantity, unit and the take-one button
fn view_product(product: &Product) -> Element<Message> {
    let badge: Element<Message> = if product.is_low_stock() {
        text("Low").size(13).color(DANGER).into()
    } else {
        horizontal_space().into()
    };

    let quantity = if product.is_low_stock() {
        text(product.quantity.to_string()).size(28).color(DANGER)
    } else {
        text(product.quantity.to_string()).size(28)
    };

    let content = column![
        row![text(&product.name).size(18), horizontal_space(), badge].align_y(Alignment::Center),
        text(format!("Code #{}", product.id)).size(12).color(MUTED),
        row![
            quantity,
            text(&product.unit).color(MUTED),
            horizontal_space(),
            button(text("-1"))
                .on_press(Message::UseOne(product.id))
                .style(button::secondary),
        ]
        .spacing(6)
        .align_y(Alignment::Center),
    ]
    .spacing(8);

    container(card(content)).width(Length::FillPortion(1)).into()
}
