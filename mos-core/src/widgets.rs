//! Display widgets as plain state: render to a description, react to events with effects.

use serde_json::Value;

use crate::format::{format_text, format_value, MISSING};
use crate::notification::NotificationConfig;
use crate::ticker::Ticker;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Click,
    Hover,
    Delete,
    /// Result of a widget's own data request.
    Loaded(Result<Value, String>),
}

/// Work a widget asks the host to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenUrl(String),
    Notify(NotificationConfig),
    Search(Ticker),
    RemoveFavourite(Ticker),
}

/// What the host should draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    pub text: String,
    pub subtitle: Option<String>,
    pub color: Option<String>,
    pub class: &'static str,
    pub clickable: bool,
}

pub trait Widget {
    fn render(&self) -> Rendered;
    fn on_event(&mut self, event: &WidgetEvent) -> Vec<Effect>;
}

/// A bound text or value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueWidget {
    pub text: Option<String>,
    pub color: Option<String>,
}

impl Widget for ValueWidget {
    fn render(&self) -> Rendered {
        Rendered {
            text: format_text(self.text.as_deref()),
            color: self.color.clone(),
            class: "general-value",
            ..Rendered::default()
        }
    }

    fn on_event(&mut self, _event: &WidgetEvent) -> Vec<Effect> {
        Vec::new()
    }
}

/// An external link shown without its leading host label (`https://www.apple.com` → `apple.com`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkWidget {
    pub url: Option<String>,
}

impl LinkWidget {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.filter(|u| !u.is_empty() && u != "null"),
        }
    }
}

impl Widget for LinkWidget {
    fn render(&self) -> Rendered {
        let text = match &self.url {
            Some(url) => match url.find('.') {
                Some(idx) => url[idx + 1..].to_string(),
                None => url.clone(),
            },
            None => MISSING.to_string(),
        };
        Rendered {
            text,
            class: "link-value",
            clickable: self.url.is_some(),
            ..Rendered::default()
        }
    }

    fn on_event(&mut self, event: &WidgetEvent) -> Vec<Effect> {
        match (event, &self.url) {
            (WidgetEvent::Click, Some(url)) => vec![Effect::OpenUrl(url.clone())],
            _ => Vec::new(),
        }
    }
}

/// A place name linking to a map search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLinkWidget {
    pub location: Option<String>,
}

impl MapLinkWidget {
    pub fn new(location: Option<String>) -> Self {
        Self {
            location: location.filter(|l| !l.is_empty() && l != "null"),
        }
    }

    pub fn map_url(location: &str) -> String {
        format!("https://maps.google.com/?q={location}")
    }
}

impl Widget for MapLinkWidget {
    fn render(&self) -> Rendered {
        let text = match &self.location {
            Some(loc) => loc.split('-').next().unwrap_or_default().trim().to_string(),
            None => MISSING.to_string(),
        };
        Rendered {
            text,
            class: "map-value",
            clickable: self.location.is_some(),
            ..Rendered::default()
        }
    }

    fn on_event(&mut self, event: &WidgetEvent) -> Vec<Effect> {
        match (event, &self.location) {
            (WidgetEvent::Click, Some(loc)) => vec![Effect::OpenUrl(Self::map_url(loc))],
            _ => Vec::new(),
        }
    }
}

/// An info icon whose text pops up as a notification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoWidget {
    pub title: Option<String>,
    pub info: Option<String>,
    pub icon: Option<String>,
}

impl Widget for InfoWidget {
    fn render(&self) -> Rendered {
        Rendered {
            text: format_text(self.info.as_deref()),
            class: "popup-info",
            clickable: self.info.is_some(),
            ..Rendered::default()
        }
    }

    fn on_event(&mut self, event: &WidgetEvent) -> Vec<Effect> {
        let (WidgetEvent::Click, Some(info)) = (event, &self.info) else {
            return Vec::new();
        };
        let title = self.title.clone().unwrap_or_else(|| "Info".to_string());
        let mut config = NotificationConfig::info(title, info.clone())
            .with_icon(self.icon.clone().unwrap_or_else(|| "information-outline".into()));
        config.id = Some(format!("info-{}", config.header));
        vec![Effect::Notify(config)]
    }
}

// ---------- Favourite card --------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CardSummary {
    pub name: Option<String>,
    pub price: String,
    pub margin_of_safety: String,
}

impl CardSummary {
    /// Pull the card fields out of a valuation response.
    pub fn from_response(data: &Value) -> Self {
        let display = |key: &str| {
            let field = data.get(key).unwrap_or(&Value::Null);
            format_value(field.get("value").unwrap_or(field))
        };
        Self {
            name: data.get("name").and_then(Value::as_str).map(str::to_string),
            price: display("current_price"),
            margin_of_safety: display("margin_of_safety_price"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    Loading,
    Loaded(CardSummary),
    Failed(String),
}

/// A tracked ticker that fetches its own valuation when inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct FavouriteCard {
    ticker: Ticker,
    state: CardState,
}

impl FavouriteCard {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            state: CardState::Loading,
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn state(&self) -> &CardState {
        &self.state
    }
}

impl Widget for FavouriteCard {
    fn render(&self) -> Rendered {
        let ticker = self.ticker.canonical();
        match &self.state {
            CardState::Loading => Rendered {
                text: ticker,
                subtitle: None,
                class: "favourite skeleton",
                ..Rendered::default()
            },
            CardState::Loaded(summary) => Rendered {
                text: ticker,
                subtitle: Some(format!(
                    "{} / MOS {}",
                    summary.price, summary.margin_of_safety
                )),
                class: "favourite",
                clickable: true,
                ..Rendered::default()
            },
            CardState::Failed(message) => Rendered {
                text: ticker,
                subtitle: Some(message.clone()),
                class: "favourite failed",
                clickable: true,
                ..Rendered::default()
            },
        }
    }

    fn on_event(&mut self, event: &WidgetEvent) -> Vec<Effect> {
        match event {
            WidgetEvent::Loaded(Ok(data)) => {
                self.state = CardState::Loaded(CardSummary::from_response(data));
                Vec::new()
            }
            WidgetEvent::Loaded(Err(message)) => {
                self.state = CardState::Failed(message.clone());
                Vec::new()
            }
            WidgetEvent::Click => vec![Effect::Search(self.ticker.clone())],
            WidgetEvent::Delete => vec![Effect::RemoveFavourite(self.ticker.clone())],
            WidgetEvent::Hover => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_drops_leading_label() {
        let mut link = LinkWidget::new(Some("https://www.apple.com".into()));
        assert_eq!(link.render().text, "apple.com");
        assert_eq!(
            link.on_event(&WidgetEvent::Click),
            vec![Effect::OpenUrl("https://www.apple.com".into())]
        );

        let mut empty = LinkWidget::new(Some("null".into()));
        assert_eq!(empty.render().text, "-");
        assert!(!empty.render().clickable);
        assert!(empty.on_event(&WidgetEvent::Click).is_empty());
    }

    #[test]
    fn map_link_shows_place_before_dash() {
        let mut map = MapLinkWidget::new(Some("Cupertino - CA 95014".into()));
        assert_eq!(map.render().text, "Cupertino");
        assert_eq!(
            map.on_event(&WidgetEvent::Click),
            vec![Effect::OpenUrl(
                "https://maps.google.com/?q=Cupertino - CA 95014".into()
            )]
        );
        assert_eq!(MapLinkWidget::new(None).render().text, "-");
    }

    #[test]
    fn info_raises_notification() {
        let mut info = InfoWidget {
            title: None,
            info: Some("Price at which the stock is worth buying".into()),
            icon: None,
        };
        let effects = info.on_event(&WidgetEvent::Click);
        match effects.as_slice() {
            [Effect::Notify(n)] => {
                assert_eq!(n.header, "Info");
                assert_eq!(n.description, "Price at which the stock is worth buying");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(info.on_event(&WidgetEvent::Hover).is_empty());
    }

    #[test]
    fn value_widget_placeholder() {
        let w = ValueWidget::default();
        assert_eq!(w.render().text, "-");
        let w = ValueWidget {
            text: Some("1 234".into()),
            color: Some("#fff".into()),
        };
        assert_eq!(w.render().color.as_deref(), Some("#fff"));
    }

    #[test]
    fn favourite_card_lifecycle() {
        let mut card = FavouriteCard::new(Ticker::parse("aapl").unwrap());
        assert_eq!(card.render().class, "favourite skeleton");

        card.on_event(&WidgetEvent::Loaded(Ok(json!({
            "name": "Apple Inc.",
            "current_price": {"value": 189.5, "color": "red"},
            "margin_of_safety_price": 120
        }))));
        let view = card.render();
        assert_eq!(view.text, "AAPL");
        assert_eq!(view.subtitle.as_deref(), Some("189.50 / MOS 120"));
        match card.state() {
            CardState::Loaded(s) => assert_eq!(s.name.as_deref(), Some("Apple Inc.")),
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            card.on_event(&WidgetEvent::Delete),
            vec![Effect::RemoveFavourite(Ticker::parse("AAPL").unwrap())]
        );

        card.on_event(&WidgetEvent::Loaded(Err("503 error".into())));
        assert_eq!(card.render().class, "favourite failed");
    }
}
