use anyhow::Result;
use rusqlite::{params, Connection};
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::tempdir;

use product_name_cleaner::config::{Backend, DatabaseConfig};
use product_name_cleaner::store::{self, SqliteProductStore};
use product_name_cleaner::{
    BatchRunner, CleanerError, NameUpdate, PageTransaction, ProductRecord, ProductStore,
};

const SCHEMA: &str = "CREATE TABLE products (id INTEGER PRIMARY KEY, description TEXT, name TEXT)";

fn seed(path: &Path, rows: &[(i64, Option<&str>, Option<&str>)]) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.execute(SCHEMA, [])?;
    for (id, description, name) in rows {
        conn.execute(
            "INSERT INTO products (id, description, name) VALUES (?1, ?2, ?3)",
            params![id, description, name],
        )?;
    }
    Ok(())
}

fn names(conn: &Connection) -> Result<Vec<(i64, Option<String>)>> {
    let mut stmt = conn.prepare("SELECT id, name FROM products ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let names = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

fn runner(page_size: usize) -> BatchRunner {
    BatchRunner::new(NonZeroUsize::new(page_size).unwrap())
}

#[test]
fn full_pass_fills_names() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("products.db");
    seed(
        &path,
        &[
            (1, Some("원피스 [블랙/S]"), None),
            (2, Some("검은색원피스"), None),
            (3, Some("3xl 검정 남성"), None),
            (4, Some("상품 1 1 1 설명"), Some("")),
            (5, None, None),
            (6, Some(""), None),
            (7, Some("Nike 운동화 260 블랙"), Some("already named")),
            (8, Some("[무료배송] 여성 린넨 셔츠 (베이지) FREE"), None),
        ],
    )?;

    let mut store = SqliteProductStore::open(&path, "products")?;
    let summary = runner(2).run(&mut store)?;

    assert_eq!(summary.total_eligible, 5);
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.updated, 4);
    assert_eq!(summary.pages, 3);

    assert_eq!(
        names(store.connection())?,
        vec![
            (1, Some("원피스".to_string())),
            (2, Some("원피스".to_string())),
            (3, None),
            (4, Some("상품 설명".to_string())),
            (5, None),
            (6, None),
            (7, Some("already named".to_string())),
            (8, Some("린넨 셔츠 FREE".to_string())),
        ]
    );

    // only the row that cleaned to nothing is still eligible
    let again = runner(2).run(&mut store)?;
    assert_eq!(again.total_eligible, 1);
    assert_eq!(again.processed, 1);
    assert_eq!(again.updated, 0);
    Ok(())
}

/// Delegates to a real store but fails the write of one page after issuing it.
struct FailingWrites<'s> {
    inner: &'s mut SqliteProductStore,
    fail_on_page: u64,
    pages_begun: u64,
}

impl ProductStore for FailingWrites<'_> {
    fn count_eligible(&mut self) -> product_name_cleaner::Result<u64> {
        self.inner.count_eligible()
    }

    fn begin_page(&mut self) -> product_name_cleaner::Result<Box<dyn PageTransaction + '_>> {
        self.pages_begun += 1;
        let fail = self.pages_begun == self.fail_on_page;
        let inner = self.inner.begin_page()?;
        Ok(Box::new(FailingPage { inner, fail }))
    }
}

struct FailingPage<'a> {
    inner: Box<dyn PageTransaction + 'a>,
    fail: bool,
}

impl PageTransaction for FailingPage<'_> {
    fn fetch_after(
        &mut self,
        after_id: i64,
        limit: usize,
    ) -> product_name_cleaner::Result<Vec<ProductRecord>> {
        self.inner.fetch_after(after_id, limit)
    }

    fn update_names(&mut self, batch: &[NameUpdate]) -> product_name_cleaner::Result<usize> {
        let changed = self.inner.update_names(batch)?;
        if self.fail {
            return Err(CleanerError::query("disk I/O error"));
        }
        Ok(changed)
    }

    fn commit(self: Box<Self>) -> product_name_cleaner::Result<()> {
        self.inner.commit()
    }
}

const CATALOG: &[(i64, Option<&str>, Option<&str>)] = &[
    (1, Some("원피스 [블랙/S]"), None),
    (2, Some("검은색원피스"), None),
    (3, Some("남성 셔츠 XL"), None),
    (4, Some("상품 1 1 1 설명"), None),
    (5, Some("린넨 셔츠"), None),
    (6, Some("네이비 니트"), None),
    (7, Some("청바지 32"), None),
];

#[test]
fn interrupted_run_resumes_where_it_stopped() -> Result<()> {
    let dir = tempdir()?;
    let interrupted_path = dir.path().join("interrupted.db");
    let clean_path = dir.path().join("clean.db");
    seed(&interrupted_path, CATALOG)?;
    seed(&clean_path, CATALOG)?;

    let mut store = SqliteProductStore::open(&interrupted_path, "products")?;
    {
        let mut failing = FailingWrites {
            inner: &mut store,
            fail_on_page: 2,
            pages_begun: 0,
        };
        let err = runner(2).run(&mut failing).unwrap_err();
        assert!(err.is_data_source());
    }

    // page 1 committed, page 2 rolled back
    assert_eq!(store.count_eligible()?, 5);
    let partial = names(store.connection())?;
    assert_eq!(partial[1], (2, Some("원피스".to_string())));
    assert_eq!(partial[2], (3, None));

    // a fresh connection sees the same committed state
    drop(store);
    let mut store = SqliteProductStore::open(&interrupted_path, "products")?;
    let resumed = runner(2).run(&mut store)?;
    assert_eq!(resumed.processed, 5);
    assert_eq!(resumed.updated, 5);

    let mut clean = SqliteProductStore::open(&clean_path, "products")?;
    runner(2).run(&mut clean)?;

    assert_eq!(names(store.connection())?, names(clean.connection())?);
    Ok(())
}

#[test]
fn open_dispatches_on_backend() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("products.db");
    seed(&path, &[(1, Some("검은색원피스"), None)])?;

    let config = DatabaseConfig {
        backend: Backend::Sqlite,
        sqlite_path: path,
        ..DatabaseConfig::default()
    };
    let mut products = store::open(&config)?;
    assert_eq!(products.count_eligible()?, 1);

    let summary = runner(10).run(&mut *products)?;
    assert_eq!(summary.updated, 1);
    Ok(())
}

#[test]
fn custom_table_name() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("shop.db");
    {
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "CREATE TABLE shop_items (id INTEGER PRIMARY KEY, description TEXT, name TEXT);
             INSERT INTO shop_items (id, description, name) VALUES (1, '네이비 니트', NULL);",
        )?;
    }

    let mut store = SqliteProductStore::open(&path, "shop_items")?;
    runner(10).run(&mut store)?;

    let name: Option<String> = store.connection().query_row(
        "SELECT name FROM shop_items WHERE id = 1",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(name.as_deref(), Some("니트"));
    Ok(())
}

#[test]
fn missing_database_file_is_a_connection_error() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("products.db");

    let err = SqliteProductStore::open(&path, "products").err().unwrap();
    assert!(matches!(err, CleanerError::Connection { .. }));
    assert!(!path.exists());

    let config = DatabaseConfig {
        backend: Backend::Sqlite,
        sqlite_path: path.clone(),
        ..DatabaseConfig::default()
    };
    let err = store::open(&config).err().unwrap();
    assert!(matches!(err, CleanerError::Connection { .. }));
    assert!(!path.exists());
    Ok(())
}
