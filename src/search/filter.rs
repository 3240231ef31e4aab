use crate::models::{Category, Listing};
use serde::Serialize;

/// Listing field a filter clause can look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Location,
    Country,
    Category,
}

impl Field {
    fn value<'a>(&self, listing: &'a Listing) -> &'a str {
        match self {
            Field::Title => &listing.title,
            Field::Description => &listing.description,
            Field::Location => &listing.location,
            Field::Country => &listing.country,
            Field::Category => listing.category.as_str(),
        }
    }
}

/// Declarative query over the listing store. Building one never touches the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Filter {
    /// Matches every listing
    All,
    /// Case-insensitive substring match; `needle` is stored lower-cased
    Contains { field: Field, needle: String },
    /// Exact match against the lower-cased field value
    Equals { field: Field, value: String },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// Build the filter for a search.
    ///
    /// * `query` matches title, description, location or country.
    /// * `countries` restricts to listings whose country contains any entry.
    /// * `category` restricts to that category.
    ///
    /// Present clauses are combined with AND; with none present the filter is [`Filter::All`].
    pub fn build(query: Option<&str>, category: Option<Category>, countries: &[String]) -> Filter {
        let mut clauses = Vec::new();

        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            clauses.push(Filter::text(query));
        }
        let countries = Filter::country_only(countries);
        if countries != Filter::All {
            clauses.push(countries);
        }
        if let Some(category) = category {
            clauses.push(Filter::category(category));
        }

        Filter::all_of(clauses)
    }

    /// Query clause: any of the searchable text fields contains `query`
    pub fn text(query: &str) -> Filter {
        Filter::Or(
            [Field::Title, Field::Description, Field::Location, Field::Country]
                .into_iter()
                .map(|field| Filter::contains(field, query))
                .collect(),
        )
    }

    /// Country-membership clause alone. Blank entries are ignored.
    pub fn country_only(countries: &[String]) -> Filter {
        let mut entries: Vec<Filter> = countries
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| Filter::contains(Field::Country, c))
            .collect();
        match entries.len() {
            0 => Filter::All,
            1 => entries.remove(0),
            _ => Filter::Or(entries),
        }
    }

    pub fn category(category: Category) -> Filter {
        Filter::Equals {
            field: Field::Category,
            value: category.as_str().to_string(),
        }
    }

    pub fn contains(field: Field, needle: &str) -> Filter {
        Filter::Contains {
            field,
            needle: needle.to_lowercase(),
        }
    }

    fn all_of(mut clauses: Vec<Filter>) -> Filter {
        match clauses.len() {
            0 => Filter::All,
            1 => clauses.remove(0),
            _ => Filter::And(clauses),
        }
    }

    /// Evaluate the filter against a single listing
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Filter::All => true,
            Filter::Contains { field, needle } => {
                field.value(listing).to_lowercase().contains(needle.as_str())
            }
            Filter::Equals { field, value } => field.value(listing).to_lowercase() == *value,
            Filter::And(clauses) => clauses.iter().all(|c| c.matches(listing)),
            Filter::Or(clauses) => clauses.iter().any(|c| c.matches(listing)),
        }
    }
}
