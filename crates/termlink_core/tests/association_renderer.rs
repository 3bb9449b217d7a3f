use std::collections::BTreeSet;
use termlink_core::db::open_db_in_memory;
use termlink_core::{
    AssociationRenderer, AssociationStore, Fragment, NewTerm, Notice, SiteConfig,
    SqliteTermMetaRepository, SqliteTermRepository, Taxonomy,
};

type Renderer<'conn> =
    AssociationRenderer<SqliteTermRepository<'conn>, SqliteTermMetaRepository<'conn>>;

fn renderer(conn: &rusqlite::Connection) -> Renderer<'_> {
    AssociationRenderer::new(
        SqliteTermRepository::new(conn),
        AssociationStore::new(SqliteTermMetaRepository::new(conn)),
    )
}

fn store(conn: &rusqlite::Connection) -> AssociationStore<SqliteTermMetaRepository<'_>> {
    AssociationStore::new(SqliteTermMetaRepository::new(conn))
}

fn category(conn: &rusqlite::Connection, name: &str) -> i64 {
    let terms = SqliteTermRepository::new(conn);
    terms.register_taxonomy(&Taxonomy::new("category")).unwrap();
    terms.create_term(&NewTerm::new("category", name)).unwrap().id
}

#[test]
fn missing_term_renders_invalid_notice() {
    let conn = open_db_in_memory().unwrap();
    category(&conn, "Books");

    let fragment = renderer(&conn).render(42, "category").unwrap();

    assert_eq!(fragment, Fragment::Notice(Notice::InvalidTerm));
    assert_eq!(fragment.into_html(), "<p>Invalid term ID or taxonomy.</p>");
}

#[test]
fn zero_id_or_unknown_taxonomy_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    let books = category(&conn, "Books");
    let renderer = renderer(&conn);

    assert_eq!(
        renderer.render(0, "category").unwrap().notice(),
        Some(Notice::InvalidTerm)
    );
    assert_eq!(
        renderer.render(books, "genre").unwrap().notice(),
        Some(Notice::InvalidTerm)
    );
    assert_eq!(
        renderer.render(books, "").unwrap().notice(),
        Some(Notice::InvalidTerm)
    );
}

#[test]
fn term_from_another_taxonomy_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    category(&conn, "Books");
    let terms = SqliteTermRepository::new(&conn);
    terms.register_taxonomy(&Taxonomy::new("post_tag")).unwrap();
    let tag = terms.create_term(&NewTerm::new("post_tag", "Books")).unwrap().id;

    let fragment = renderer(&conn).render(tag, "category").unwrap();
    assert_eq!(fragment.notice(), Some(Notice::InvalidTerm));
}

#[test]
fn renders_wrapper_with_links_to_associated_terms() {
    let conn = open_db_in_memory().unwrap();
    let terms = SqliteTermRepository::new(&conn);
    terms.register_taxonomy(&Taxonomy::new("category")).unwrap();
    let owner = terms
        .create_term(&NewTerm::new("category", "Books").with_description("Printed <matter>"))
        .unwrap()
        .id;
    let target = terms.create_term(&NewTerm::new("category", "Rock & Roll")).unwrap().id;
    store(&conn).set(owner, &BTreeSet::from([target])).unwrap();

    let html = renderer(&conn).render(owner, "category").unwrap().into_html();

    assert_eq!(
        html,
        "<div class=\"associated-terms-wrapper\">\
         <div class=\"parent-term\"><h2>Books</h2>\
         <p class=\"description\">Printed &lt;matter&gt;</p></div>\
         <ul class=\"associated-terms-list\">\
         <li><a href=\"http://localhost/category/rock-roll/\">Rock &amp; Roll</a></li>\
         </ul></div>"
    );
}

#[test]
fn rendering_is_repeatable() {
    let conn = open_db_in_memory().unwrap();
    let owner = category(&conn, "Books");
    let target = category(&conn, "Music");
    store(&conn).set(owner, &BTreeSet::from([target])).unwrap();
    let renderer = renderer(&conn);

    let first = renderer.render(owner, "category").unwrap();
    let second = renderer.render(owner, "category").unwrap();

    assert_eq!(first, second);
}

#[test]
fn dangling_and_foreign_ids_are_skipped() {
    let conn = open_db_in_memory().unwrap();
    let owner = category(&conn, "Books");
    let kept = category(&conn, "Music");
    let terms = SqliteTermRepository::new(&conn);
    terms.register_taxonomy(&Taxonomy::new("post_tag")).unwrap();
    let foreign = terms.create_term(&NewTerm::new("post_tag", "Vinyl")).unwrap().id;
    store(&conn).set(owner, &BTreeSet::from([kept, foreign, 9_999])).unwrap();

    let html = renderer(&conn).render(owner, "category").unwrap().into_html();

    assert!(html.contains(">Music</a>"));
    assert!(!html.contains("Vinyl"));
    assert_eq!(html.matches("<li>").count(), 1);
}

#[test]
fn nothing_resolved_shows_empty_notice_inside_wrapper() {
    let conn = open_db_in_memory().unwrap();
    let owner = category(&conn, "Books");
    let renderer = renderer(&conn);

    let without_links = renderer.render(owner, "category").unwrap().into_html();
    assert!(without_links.contains("<h2>Books</h2>"));
    assert!(without_links.contains("<p>No associated terms found.</p>"));
    assert!(!without_links.contains("associated-terms-list"));

    store(&conn).set(owner, &BTreeSet::from([9_999])).unwrap();
    let dangling_only = renderer.render(owner, "category").unwrap().into_html();
    assert!(dangling_only.contains("<p>No associated terms found.</p>"));
}

#[test]
fn raw_attributes_are_coerced() {
    let conn = open_db_in_memory().unwrap();
    let owner = category(&conn, "Books");
    let renderer = renderer(&conn);

    let fragment = renderer
        .render_raw(&format!(" {owner}abc"), " category ")
        .unwrap();
    assert!(fragment.notice().is_none());

    assert_eq!(
        renderer.render_raw("books", "category").unwrap().notice(),
        Some(Notice::InvalidTerm)
    );
}

#[test]
fn rewrite_slug_and_site_url_shape_links() {
    let conn = open_db_in_memory().unwrap();
    let terms = SqliteTermRepository::new(&conn);
    terms
        .register_taxonomy(&Taxonomy::new("post_tag").with_rewrite_slug("tag"))
        .unwrap();
    let owner = terms.create_term(&NewTerm::new("post_tag", "Rust")).unwrap().id;
    let target = terms.create_term(&NewTerm::new("post_tag", "Systems")).unwrap().id;
    store(&conn).set(owner, &BTreeSet::from([target])).unwrap();

    let renderer = AssociationRenderer::new(
        SqliteTermRepository::with_site(&conn, SiteConfig::new("https://example.org/")),
        AssociationStore::new(SqliteTermMetaRepository::new(&conn)),
    );
    let html = renderer.render(owner, "post_tag").unwrap().into_html();

    assert!(html.contains("href=\"https://example.org/tag/systems/\""));
}
