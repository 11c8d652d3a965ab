//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, Kind,
    category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES},
};

/// Create a category and return it with its generated ID.
///
/// Category names are not required to be unique.
pub fn create_category(
    name: CategoryName,
    kind: Kind,
    connection: &Connection,
) -> Result<Category, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO categories (name, type, created_at) VALUES (?1, ?2, ?3);",
        (name.as_ref(), kind, created_at),
    )?;

    let id = connection.last_insert_rowid();

    get_category(id, connection)
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `category_id` does not refer to a category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type, created_at FROM categories WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve categories ordered by kind and then name, or just by name when
/// only one `kind` is requested.
pub fn list_categories(kind: Option<Kind>, connection: &Connection) -> Result<Vec<Category>, Error> {
    match kind {
        Some(kind) => connection
            .prepare(
                "SELECT id, name, type, created_at FROM categories
                WHERE type = ?1 ORDER BY name ASC, id ASC;",
            )?
            .query_map([kind], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect(),
        None => connection
            .prepare(
                "SELECT id, name, type, created_at FROM categories
                ORDER BY type ASC, name ASC, id ASC;",
            )?
            .query_map([], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect(),
    }
}

/// Find the first category with exactly `name` and `kind`.
pub(crate) fn find_category(
    name: &CategoryName,
    kind: Kind,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    let result = connection
        .prepare(
            "SELECT id, name, type, created_at FROM categories
            WHERE name = ?1 AND type = ?2 ORDER BY id ASC LIMIT 1;",
        )?
        .query_row((name.as_ref(), kind), map_row);

    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Insert [DEFAULT_CATEGORIES] if, and only if, the category table is empty.
///
/// Returns the number of categories inserted.
pub fn seed_default_categories(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM categories;", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(0);
    }

    let created_at = OffsetDateTime::now_utc();
    let mut statement =
        connection.prepare("INSERT INTO categories (name, type, created_at) VALUES (?1, ?2, ?3);")?;

    for (name, kind) in DEFAULT_CATEGORIES {
        statement.execute((name, kind, created_at))?;
    }

    tracing::info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());

    Ok(DEFAULT_CATEGORIES.len())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_categories_type_name ON categories(type, name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let kind = row.get(2)?;
    let created_at = row.get(3)?;

    Ok(Category {
        id,
        name,
        kind,
        created_at,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error, Kind,
        category::{CategoryName, DEFAULT_CATEGORIES, create_category, get_category, list_categories},
        db::initialize,
    };

    use super::{create_category_table, find_category, seed_default_categories};

    fn get_empty_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    fn get_seeded_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_empty_db_connection();
        let name = CategoryName::new("Categorically a category").unwrap();

        let category = create_category(name.clone(), Kind::Expense, &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.kind, Kind::Expense);
    }

    #[test]
    fn create_category_allows_duplicate_names() {
        let connection = get_empty_db_connection();
        let name = CategoryName::new_unchecked("식비");

        let first = create_category(name.clone(), Kind::Expense, &connection).unwrap();
        let second = create_category(name, Kind::Expense, &connection).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn get_category_succeeds() {
        let connection = get_empty_db_connection();
        let inserted = create_category(CategoryName::new_unchecked("Foo"), Kind::Income, &connection)
            .expect("Could not create test category");

        let selected = get_category(inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_empty_db_connection();
        let inserted = create_category(CategoryName::new_unchecked("Foo"), Kind::Income, &connection)
            .expect("Could not create test category");

        let selected = get_category(inserted.id + 123, &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn seeds_four_income_and_eight_expense_categories() {
        let connection = get_seeded_db_connection();

        let income = list_categories(Some(Kind::Income), &connection).unwrap();
        let expense = list_categories(Some(Kind::Expense), &connection).unwrap();

        assert_eq!(income.len(), 4);
        assert_eq!(expense.len(), 8);
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let connection = get_seeded_db_connection();

        let inserted = seed_default_categories(&connection).unwrap();
        initialize(&connection).expect("Could not initialize database again");

        assert_eq!(inserted, 0);
        assert_eq!(
            list_categories(None, &connection).unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[test]
    fn list_orders_by_kind_then_name() {
        let connection = get_empty_db_connection();
        create_category(CategoryName::new_unchecked("b"), Kind::Income, &connection).unwrap();
        create_category(CategoryName::new_unchecked("a"), Kind::Income, &connection).unwrap();
        create_category(CategoryName::new_unchecked("c"), Kind::Expense, &connection).unwrap();

        let got: Vec<(Kind, String)> = list_categories(None, &connection)
            .unwrap()
            .into_iter()
            .map(|category| (category.kind, category.name.to_string()))
            .collect();

        assert_eq!(
            got,
            vec![
                (Kind::Expense, "c".to_owned()),
                (Kind::Income, "a".to_owned()),
                (Kind::Income, "b".to_owned()),
            ]
        );
    }

    #[test]
    fn list_with_kind_filter_orders_by_name() {
        let connection = get_empty_db_connection();
        create_category(CategoryName::new_unchecked("z"), Kind::Expense, &connection).unwrap();
        create_category(CategoryName::new_unchecked("y"), Kind::Income, &connection).unwrap();
        create_category(CategoryName::new_unchecked("x"), Kind::Expense, &connection).unwrap();

        let got: Vec<String> = list_categories(Some(Kind::Expense), &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(got, vec!["x".to_owned(), "z".to_owned()]);
    }

    #[test]
    fn find_category_matches_name_and_kind() {
        let connection = get_seeded_db_connection();
        let name = CategoryName::new_unchecked("급여");

        let income = find_category(&name, Kind::Income, &connection).unwrap();
        let expense = find_category(&name, Kind::Expense, &connection).unwrap();

        assert!(income.is_some());
        assert_eq!(expense, None);
    }
}
