use log::info;

use crate::config::{DashboardConfig, FAVOURITE_TICKERS_COOKIE};
use crate::error::Result;
use crate::storage::Storage;
use crate::ticker::Ticker;
use crate::tickers::TickerList;
use crate::widgets::FavouriteCard;

/// Cookie-backed set of tracked tickers, in the order they were added.
#[derive(Debug, Clone)]
pub struct Favourites {
    list: TickerList,
    max_age_secs: u64,
}

impl Favourites {
    pub fn load(storage: &dyn Storage, config: &DashboardConfig) -> Self {
        Self {
            list: TickerList::favourites().load(storage, FAVOURITE_TICKERS_COOKIE),
            max_age_secs: config.cookie_max_age_secs,
        }
    }

    /// Track `ticker`. Returns the card to insert, or `None` if it was already tracked.
    pub fn favourite(
        &mut self,
        storage: &mut dyn Storage,
        ticker: Ticker,
    ) -> Result<Option<FavouriteCard>> {
        // Another tab may have written since we loaded.
        self.reload(storage);
        if !self.list.push(ticker.clone()) {
            return Ok(None);
        }
        self.list
            .save(storage, FAVOURITE_TICKERS_COOKIE, self.max_age_secs)?;
        info!("tracking {ticker}");
        Ok(Some(FavouriteCard::new(ticker)))
    }

    /// Stop tracking `ticker`. Returns whether it was tracked.
    pub fn delete(&mut self, storage: &mut dyn Storage, ticker: &Ticker) -> Result<bool> {
        self.reload(storage);
        if !self.list.remove(ticker) {
            return Ok(false);
        }
        self.list
            .save(storage, FAVOURITE_TICKERS_COOKIE, self.max_age_secs)?;
        info!("stopped tracking {ticker}");
        Ok(true)
    }

    /// One loading card per tracked ticker, for the initial render.
    pub fn cards(&self) -> Vec<FavouriteCard> {
        self.list.iter().cloned().map(FavouriteCard::new).collect()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.list.contains(ticker)
    }

    pub fn tickers(&self) -> &[Ticker] {
        self.list.as_slice()
    }

    fn reload(&mut self, storage: &dyn Storage) {
        self.list = TickerList::favourites().load(storage, FAVOURITE_TICKERS_COOKIE);
    }
}
