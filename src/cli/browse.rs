use std::rc::Rc;

use tabled::Table;

use crate::{
    catalog::{Level, Node, NodeList, Product, ProductDay},
    cli::Session,
    dates, error,
    error::CatalogError,
    types::{EntryTableRow, ImageTableRow},
    warning,
};

/// Which day `images` should list.
#[derive(Debug, Clone)]
pub enum DaySelector {
    Date(String),
    DayOfYear { year: i32, day: u16 },
}

pub fn collections(session: &Session, refresh: bool) {
    let listed = if refresh {
        session.catalog.collections_available()
    } else {
        session.catalog.collections()
    };

    match listed {
        Ok(nodes) => print_entries(&nodes),
        Err(e) => error!("Cannot list collections. Err: {}", e),
    }
}

pub fn products(session: &Session, collection: &str, refresh: bool) {
    let listed = session.catalog.find_collection(collection).and_then(|c| {
        if refresh {
            c.products_available()
        } else {
            c.products()
        }
    });

    match listed {
        Ok(nodes) => print_entries(&nodes),
        Err(e) => error!("Cannot list products of {}. Err: {}", collection, e),
    }
}

pub fn years(session: &Session, collection: &str, product: &str, refresh: bool) {
    let listed = session.catalog.find_product(collection, product).and_then(|p| {
        if refresh {
            p.years_available()
        } else {
            p.years()
        }
    });

    match listed {
        Ok(nodes) => print_entries(&nodes),
        Err(e) => error!("Cannot list years of {}/{}. Err: {}", collection, product, e),
    }
}

pub fn days(session: &Session, collection: &str, product: &str, year: i32, refresh: bool) {
    let listed = session
        .catalog
        .find_product(collection, product)
        .and_then(|p| p.find_year(year))
        .and_then(|y| {
            if refresh {
                y.days_available()
            } else {
                y.days()
            }
        });

    match listed {
        Ok(nodes) => print_entries(&nodes),
        Err(e) => error!(
            "Cannot list days of {}/{}/{}. Err: {}",
            collection, product, year, e
        ),
    }
}

pub fn images(
    session: &Session,
    collection: &str,
    product: &str,
    selector: DaySelector,
    refresh: bool,
) {
    let listed = session
        .catalog
        .find_product(collection, product)
        .and_then(|p| resolve_day(&p, &selector))
        .and_then(|day| {
            if refresh {
                day.images_available()
            } else {
                day.images()
            }
        });

    match listed {
        Ok(images) if images.is_empty() => warning!("The day directory is empty."),
        Ok(images) => {
            let rows: Vec<ImageTableRow> = images.iter().map(ImageTableRow::from).collect();
            println!("{}", Table::new(rows));
        }
        Err(e) => error!("Cannot list images. Err: {}", e),
    }
}

fn resolve_day(product: &Product, selector: &DaySelector) -> Result<Rc<ProductDay>, CatalogError> {
    match selector {
        DaySelector::Date(date) => product.date(dates::parse_date(date)?),
        DaySelector::DayOfYear { year, day } => product.find_year(*year)?.find_day(*day),
    }
}

fn print_entries<L: Level>(nodes: &NodeList<L>) {
    if nodes.is_empty() {
        warning!("Nothing listed at this level.");
        return;
    }

    let rows: Vec<EntryTableRow> = nodes
        .iter()
        .filter_map(|node: &Rc<Node<L>>| node.record().ok())
        .map(|record| EntryTableRow::from(record.as_ref()))
        .collect();

    println!("{}", Table::new(rows));
}
