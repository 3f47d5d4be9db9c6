use chrono::{DateTime, Utc};

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/720x400";
pub const NO_DESCRIPTION: &str = "No description available.";

/// A single news article as returned by the news source
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub url: String,
    pub source_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }

    pub fn image_or_placeholder(&self) -> &str {
        self.image_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// One page of results from the news source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total_results: Option<u64>,
}

/// Static loan-rate entry shown in the rates panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bank {
    pub name: &'static str,
    pub rate: &'static str,
    pub fee: &'static str,
    pub link: &'static str,
}

pub const BANKS: [Bank; 7] = [
    Bank {
        name: "Central Bank of India",
        rate: "MCLR + 1.35%",
        fee: "Up to 1% of the loan amount",
        link: "https://www.centralbankofindia.co.in/",
    },
    Bank {
        name: "IndusInd Bank",
        rate: "9.10% onwards",
        fee: "Up to 2% + GST",
        link: "https://www.indusind.com/",
    },
    Bank {
        name: "HDFC Bank",
        rate: "9.10% - 16.05% p.a.",
        fee: "2% to 4% or Rs.2,500",
        link: "https://www.hdfcbank.com/",
    },
    Bank {
        name: "Federal Bank",
        rate: "At the discretion of the bank",
        fee: "As per lender's terms",
        link: "https://www.federalbank.co.in/",
    },
    Bank {
        name: "Union Bank of India",
        rate: "Based on credit rating and loan amount",
        fee: "As per lender's terms",
        link: "https://www.unionbankofindia.co.in/",
    },
    Bank {
        name: "Karur Vysya Bank",
        rate: "One year MCLR + 0.35%",
        fee: "As per lender's terms",
        link: "https://www.kvb.co.in/",
    },
    Bank {
        name: "UCO Bank",
        rate: "Base Rate, Simple rate at half yearly rest",
        fee: "As per lender's terms",
        link: "https://www.ucobank.com/",
    },
];
