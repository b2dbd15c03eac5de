mod common;

use std::rc::Rc;

use chrono::NaiveDate;
use common::{BASE_URL, MockArchive, modis_archive};
use modiscat::{
    dates::YearDay,
    error::CatalogError,
    tile::TilePosition,
    types::Record,
};

#[test]
fn test_nothing_is_fetched_on_construction() {
    let archive = modis_archive();
    let catalog = archive.catalog();

    let product = catalog.collection("61").product("MOD09A1");
    let year = product.year(2020);
    let day = year.day(214).unwrap();

    // Navigating by key never touches the archive
    assert_eq!(archive.call_count(), 0);
    assert!(!day.is_fetched());
    assert_eq!(day.path().to_string(), "/61/MOD09A1/2020/214");
    assert_eq!(day.url(), format!("{}61/MOD09A1/2020/214", BASE_URL));
}

#[test]
fn test_data_is_cached() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");

    let first = collection.data().unwrap();
    let second = collection.data().unwrap();

    // Same object, one fetch
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(archive.calls(), vec!["61".to_string()]);
}

#[test]
fn test_data_available_always_fetches() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");

    let cached = collection.data().unwrap();
    archive.set_listing("61", vec![Record::new("MOD09A1"), Record::new("MOD13Q1")]);

    let fresh = collection.data_available().unwrap();
    assert!(!Rc::ptr_eq(&cached, &fresh));
    assert_eq!(fresh.len(), 2);
    assert_eq!(fresh[1].name, "MOD13Q1");
    assert_eq!(archive.calls_to("61"), 2);

    // The refreshed value is what later lazy reads see
    let after = collection.data().unwrap();
    assert!(Rc::ptr_eq(&fresh, &after));
    assert_eq!(archive.calls_to("61"), 2);

    // Forced refresh also works before anything was cached
    let other = catalog.collection("6");
    archive.set_listing("6", vec![Record::new("MOD09A1")]);
    other.data_available().unwrap();
    assert_eq!(archive.calls_to("6"), 1);
}

#[test]
fn test_failed_fetch_leaves_cache_unchanged() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");

    // Unfetched stays unfetched
    archive.fail("61");
    let err = collection.data().unwrap_err();
    assert!(matches!(err, CatalogError::Fetch(_)));
    assert!(!collection.is_fetched());

    // A cached value survives a failed refresh
    archive.recover("61");
    let cached = collection.data().unwrap();
    archive.fail("61");
    assert!(collection.data_available().is_err());
    let still = collection.data().unwrap();
    assert!(Rc::ptr_eq(&cached, &still));
}

#[test]
fn test_fetch_error_is_not_retried() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    archive.fail("61/MOD09A1");

    let product = catalog.collection("61").product("MOD09A1");
    assert!(product.years().is_err());
    assert_eq!(archive.calls_to("61/MOD09A1"), 1);
}

#[test]
fn test_children_enumeration_is_cached() {
    let archive = modis_archive();
    let catalog = archive.catalog();

    let first = catalog.collections().unwrap();
    let second = catalog.collections().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(archive.calls(), vec!["".to_string()]);

    let keys: Vec<&String> = first.iter().map(|c| c.key()).collect();
    assert_eq!(keys, vec!["5", "6", "61"]);

    // Enumerated nodes are the same nodes child() hands out
    let sixty_one = catalog.collection("61");
    assert!(Rc::ptr_eq(&first[2], &sixty_one));
}

#[test]
fn test_children_available_refetches() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let product = catalog.collection("61").product("MOD09A1");

    assert_eq!(product.years().unwrap().len(), 3);
    archive.set_listing(
        "61/MOD09A1",
        vec![Record::new("2020"), Record::new("2021"), Record::new("2022")],
    );
    assert_eq!(product.years().unwrap().len(), 3);

    let years = product.years_available().unwrap();
    let keys: Vec<i32> = years.iter().map(|y| *y.key()).collect();
    assert_eq!(keys, vec![2020, 2021, 2022]);
    assert_eq!(archive.calls_to("61/MOD09A1"), 2);
}

#[test]
fn test_enumeration_skips_foreign_entries() {
    let archive = MockArchive::new()
        .with_listing("61", &["MOD09A1"])
        .with_listing("61/MOD09A1", &["2020", "README", "20201"])
        .with_listing("61/MOD09A1/2020", &["001", "060", "366", "367", "notes"]);
    let catalog = archive.catalog();
    let product = catalog.collection("61").product("MOD09A1");

    let years: Vec<i32> = product.years().unwrap().iter().map(|y| *y.key()).collect();
    assert_eq!(years, vec![2020]);

    let days: Vec<u16> = product
        .year(2020)
        .days()
        .unwrap()
        .iter()
        .map(|d| d.year_day().day)
        .collect();
    assert_eq!(days, vec![1, 60, 366]);
}

#[test]
fn test_record_resolves_lazily_once() {
    let archive = MockArchive::new();
    archive.set_listing(
        "",
        vec![
            Record::new("61")
                .with_size(0)
                .with_last_modified("2024-01-10 12:00")
                .with_attribute("kind", "directory"),
        ],
    );
    let catalog = archive.catalog();
    let collection = catalog.collection("61");
    assert_eq!(archive.call_count(), 0);

    // Attribute access triggers the lookup in the parent listing
    assert_eq!(collection.name().unwrap(), "61");
    assert_eq!(collection.size().unwrap(), Some(0));
    assert_eq!(
        collection.last_modified().unwrap().as_deref(),
        Some("2024-01-10 12:00")
    );
    assert_eq!(
        collection.attribute("kind").unwrap(),
        Some(serde_json::Value::from("directory"))
    );
    assert_eq!(collection.attribute("missing").unwrap(), None);

    let first = collection.record().unwrap();
    let second = collection.record().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(archive.calls(), vec!["".to_string()]);
}

#[test]
fn test_record_of_enumerated_node_needs_no_fetch() {
    let archive = modis_archive();
    let catalog = archive.catalog();

    let collections = catalog.collections().unwrap();
    for collection in collections.iter() {
        assert_eq!(collection.size().unwrap(), Some(100));
    }
    assert_eq!(archive.call_count(), 1);
}

#[test]
fn test_record_available_replaces_snapshot() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");

    assert_eq!(collection.size().unwrap(), Some(100));
    archive.set_listing("", vec![Record::new("61").with_size(7)]);
    assert_eq!(collection.size().unwrap(), Some(100));

    let fresh = collection.record_available().unwrap();
    assert_eq!(fresh.size, Some(7));
    assert_eq!(collection.size().unwrap(), Some(7));
}

#[test]
fn test_record_of_missing_key_is_not_found() {
    let archive = modis_archive();
    let catalog = archive.catalog();

    let err = catalog.collection("404").record().unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { kind: "collection", .. }));
}

#[test]
fn test_find_checks_the_parent_listing() {
    let archive = modis_archive();
    let catalog = archive.catalog();

    let product = catalog.find_product("61", "MOD09A1").unwrap();
    assert_eq!(product.key(), "MOD09A1");
    assert_eq!(archive.calls(), vec!["".to_string(), "61".to_string()]);

    let err = catalog.find_collection("7").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { kind: "collection", .. }));

    let err = catalog.find_product("61", "MOD99").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { kind: "product", .. }));

    assert!(catalog.collection("61").has_product("MYD09A1").unwrap());
    assert!(!catalog.collection("61").has_product("MOD99").unwrap());
}

#[test]
fn test_zero_padded_days_match_numeric_lookup() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let year = catalog.collection("61").product("MOD09A1").year(2021);

    let day = year.find_day(1).unwrap();
    assert_eq!(day.year_day(), YearDay::new(2021, 1));
    assert_eq!(day.name().unwrap(), "001");
    assert_eq!(day.path().to_string(), "/61/MOD09A1/2021/001");
    assert!(year.has_day(2).unwrap());
    assert!(!year.has_day(3).unwrap());
}

#[test]
fn test_invalid_day_is_rejected_before_fetch() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let year = catalog.collection("61").product("MOD09A1").year(2021);

    assert!(matches!(year.day(366), Err(CatalogError::Validation(_))));
    assert!(matches!(year.find_day(0), Err(CatalogError::Validation(_))));
    assert_eq!(archive.call_count(), 0);
}

#[test]
fn test_product_date_lookup() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let product = catalog.collection("61").product("MOD09A1");

    let day = product
        .date(NaiveDate::from_ymd_opt(2020, 8, 1).unwrap())
        .unwrap();
    assert_eq!(day.year_day(), YearDay::new(2020, 214));
    assert_eq!(day.date().unwrap(), NaiveDate::from_ymd_opt(2020, 8, 1).unwrap());

    let err = product
        .date(NaiveDate::from_ymd_opt(2020, 8, 3).unwrap())
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { kind: "day", .. }));
}

#[test]
fn test_product_days_in_range_skips_gaps() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let product = catalog.collection("61").product("MOD09A1");

    let days = product
        .days_in_range(
            NaiveDate::from_ymd_opt(2020, 12, 30).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 3).unwrap(),
        )
        .unwrap();
    let found: Vec<YearDay> = days.iter().map(|d| d.year_day()).collect();
    assert_eq!(
        found,
        vec![
            YearDay::new(2020, 366),
            YearDay::new(2021, 1),
            YearDay::new(2021, 2),
        ]
    );

    // Each year listing was fetched once even though several days were checked
    assert_eq!(archive.calls_to("61/MOD09A1/2020"), 1);
    assert_eq!(archive.calls_to("61/MOD09A1/2021"), 1);
}

#[test]
fn test_year_days_range() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let year = catalog.collection("61").product("MOD09A1").year(2020);

    let days: Vec<u16> = year
        .days_range(213, 217)
        .unwrap()
        .iter()
        .map(|d| d.year_day().day)
        .collect();
    assert_eq!(days, vec![214, 215, 217]);

    assert!(matches!(
        year.days_range(217, 213),
        Err(CatalogError::Validation(_))
    ));
}

#[test]
fn test_images_carry_urls_and_positions() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let day = catalog
        .collection("61")
        .product("MOD09A1")
        .year(2020)
        .day(214)
        .unwrap();

    let images = day.images().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(
        images[0].url,
        format!(
            "{}61/MOD09A1/2020/214/MOD09A1.A2020214.h15v00.061.2020224043621.hdf",
            BASE_URL
        )
    );
    assert_eq!(images[1].position, Some(TilePosition::new(16, 0)));
    assert_eq!(
        images[0].granule.as_ref().map(|g| g.product.as_str()),
        Some("MOD09A1")
    );

    let again = day.images().unwrap();
    assert!(Rc::ptr_eq(&images, &again));
    assert_eq!(archive.calls_to("61/MOD09A1/2020/214"), 1);

    day.images_available().unwrap();
    assert_eq!(archive.calls_to("61/MOD09A1/2020/214"), 2);
}

#[test]
fn test_image_tile_lookup() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let day = catalog
        .collection("61")
        .product("MOD09A1")
        .year(2020)
        .day(214)
        .unwrap();

    let tile = day.image_tile(TilePosition::new(15, 0)).unwrap();
    assert!(tile.name().contains("h15v00"));

    let err = day.image_tile(TilePosition::new(99, 99)).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { kind: "tile", .. }));

    let by_name = day
        .image("MOD09A1.A2020214.h16v00.061.2020224043622.hdf")
        .unwrap();
    assert_eq!(by_name.position, Some(TilePosition::new(16, 0)));
    assert!(day.image("nope.hdf").unwrap_err().is_not_found());
}

#[test]
fn test_download_tile_goes_through_downloader() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let day = catalog
        .collection("61")
        .product("MOD09A1")
        .year(2020)
        .day(214)
        .unwrap();

    let destination = std::path::Path::new("/tmp/modis");
    let path = day
        .download_tile(TilePosition::new(16, 0), archive.as_ref(), destination)
        .unwrap();

    assert_eq!(
        path,
        destination.join("MOD09A1.A2020214.h16v00.061.2020224043622.hdf")
    );
    let downloads = archive.downloads();
    assert_eq!(downloads.len(), 1);
    assert!(downloads[0].0.ends_with("/2020/214/MOD09A1.A2020214.h16v00.061.2020224043622.hdf"));

    // Unknown tile never reaches the downloader
    assert!(day
        .download_tile(TilePosition::new(1, 1), archive.as_ref(), destination)
        .is_err());
    assert_eq!(archive.downloads().len(), 1);
}

#[test]
fn test_refreshed_listing_reaches_child_records() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");
    let product = collection.product("MOD09A1");

    assert_eq!(product.size().unwrap(), Some(100));
    archive.set_listing(
        "61",
        vec![
            Record::new("MOD09A1").with_size(1),
            Record::new("MYD09A1").with_size(100),
        ],
    );
    assert_eq!(product.size().unwrap(), Some(100));

    collection.data_available().unwrap();
    assert_eq!(product.size().unwrap(), Some(1));
    assert_eq!(archive.calls_to("61"), 2);

    // Stable again until the next refresh
    let first = product.record().unwrap();
    let second = product.record().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn test_refreshed_listing_reaches_enumerated_children() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");

    let before = collection.products().unwrap();
    assert_eq!(before.len(), 2);
    archive.set_listing(
        "61",
        vec![
            Record::new("MOD09A1"),
            Record::new("MOD13Q1"),
            Record::new("MYD09A1"),
        ],
    );

    collection.data_available().unwrap();
    let after = collection.products().unwrap();
    let keys: Vec<&String> = after.iter().map(|p| p.key()).collect();
    assert_eq!(keys, vec!["MOD09A1", "MOD13Q1", "MYD09A1"]);
    assert_eq!(archive.calls_to("61"), 2);

    // Nodes keep their identity across the rebuild
    assert!(Rc::ptr_eq(&before[0], &after[0]));
    assert_eq!(after[0].size().unwrap(), None);
}

#[test]
fn test_refreshed_listing_reaches_images() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let day = catalog
        .collection("61")
        .product("MOD09A1")
        .year(2020)
        .day(214)
        .unwrap();

    assert_eq!(day.images().unwrap().len(), 2);
    archive.set_listing(
        "61/MOD09A1/2020/214",
        vec![Record::new("MOD09A1.A2020214.h99v99.061.2020230000000.hdf")],
    );

    let listing = day.data_available().unwrap();
    assert_eq!(listing.len(), 1);

    let images = day.images().unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0].name().contains("h99v99"));
    assert!(day.image_tile(TilePosition::new(15, 0)).unwrap_err().is_not_found());
    assert_eq!(archive.calls_to("61/MOD09A1/2020/214"), 2);
}

#[test]
fn test_failed_refresh_keeps_derived_views() {
    let archive = modis_archive();
    let catalog = archive.catalog();
    let collection = catalog.collection("61");

    let products = collection.products().unwrap();
    archive.fail("61");
    assert!(collection.data_available().is_err());

    let again = collection.products().unwrap();
    assert!(Rc::ptr_eq(&products, &again));
}
