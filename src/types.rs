use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BackofficeError;

/// Key-value entry holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Key-value entry holding the signed-in user as JSON.
pub const USER_DATA_KEY: &str = "userData";

pub const FAQS_KEY: &str = "admin_faqs";
pub const CMS_KEY: &str = "admin_cms";
pub const PRODUCTS_KEY: &str = "admin_products";

/// Firestore collection holding categories.
pub const CATEGORY_COLLECTION: &str = "category";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Rows per page offered by list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 5] = [
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Thirty,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn as_u32(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Thirty => 30,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    pub fn as_usize(self) -> usize {
        self.as_u32() as usize
    }
}

impl TryFrom<u32> for PageSize {
    type Error = BackofficeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.as_u32() == value)
            .ok_or_else(|| {
                BackofficeError::Other(format!(
                    "invalid page size {value}, expected one of: {}",
                    VALID_PAGE_SIZES.join(", ")
                ))
            })
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.as_u32()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

impl FromStr for PageSize {
    type Err = BackofficeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| BackofficeError::Other(format!("invalid page size: {s}")))?;
        PageSize::try_from(value)
    }
}

pub const VALID_PAGE_SIZES: &[&str] = &["10", "20", "30", "50", "100"];
