use std::collections::BTreeSet;
use termlink_core::db::open_db_in_memory;
use termlink_core::{
    parse_attributes, AssociationEditor, AssociationIntegration, AssociationRenderer,
    AssociationStore, CrossTermPostQuery, EmbedRenderer, HookError, HookEvent, HookOutcome,
    HookRegistry, NewPost, NewTerm, SaveOutcome, SqlitePostRepository, SqliteTermMetaRepository,
    SqliteTermRepository, SubmittedField, Taxonomy, TaxonomySelection,
};

fn register_taxonomies(conn: &rusqlite::Connection) {
    let terms = SqliteTermRepository::new(conn);
    terms.register_taxonomy(&Taxonomy::new("category")).unwrap();
    terms
        .register_taxonomy(&Taxonomy::new("post_tag").with_rewrite_slug("tag"))
        .unwrap();
    terms
        .register_taxonomy(&Taxonomy::new("nav_menu").private())
        .unwrap();
}

fn integration(
    conn: &rusqlite::Connection,
) -> AssociationIntegration<SqliteTermRepository<'_>, SqliteTermMetaRepository<'_>> {
    AssociationIntegration::new(AssociationEditor::new(
        SqliteTermRepository::new(conn),
        AssociationStore::new(SqliteTermMetaRepository::new(conn)),
    ))
}

#[test]
fn default_selection_binds_public_taxonomies_only() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let mut registry = HookRegistry::new();

    let bound = registry
        .register(&SqliteTermRepository::new(&conn), &TaxonomySelection::default())
        .unwrap();

    assert_eq!(bound, 2);
    assert_eq!(registry.taxonomies(), vec!["category", "post_tag"]);
    assert!(registry.is_bound("category_add_form_fields"));
    assert!(registry.is_bound("edited_post_tag"));
    assert!(!registry.is_bound("created_nav_menu"));
}

#[test]
fn registering_twice_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let directory = SqliteTermRepository::new(&conn);
    let mut registry = HookRegistry::new();
    registry
        .register(&directory, &TaxonomySelection::default())
        .unwrap();

    let err = registry
        .register(&directory, &TaxonomySelection::Only(vec!["category".to_string()]))
        .unwrap_err();
    assert!(matches!(err, HookError::DuplicateTaxonomy(name) if name == "category"));
}

#[test]
fn dispatch_routes_form_and_save_events() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let directory = SqliteTermRepository::new(&conn);
    let books = directory.create_term(&NewTerm::new("category", "Books")).unwrap();
    let music = directory.create_term(&NewTerm::new("category", "Music")).unwrap();
    let mut registry = HookRegistry::new();
    registry
        .register(&directory, &TaxonomySelection::default())
        .unwrap();
    let integration = integration(&conn);

    let create = registry
        .dispatch(&integration, HookEvent::AddFormFields { taxonomy: "category" })
        .unwrap();
    assert!(matches!(create, HookOutcome::Markup(html) if html.contains("term-group\"")));

    let submission = SubmittedField::from(vec![music.id.to_string()]);
    let saved = registry
        .dispatch(
            &integration,
            HookEvent::Created {
                taxonomy: "category",
                term_id: books.id,
                submission: &submission,
            },
        )
        .unwrap();
    assert_eq!(saved, HookOutcome::Saved(SaveOutcome::Stored(1)));

    let edit = registry
        .dispatch(&integration, HookEvent::EditFormFields { term: &books })
        .unwrap();
    assert!(matches!(edit, HookOutcome::Markup(html) if html.contains("selected=\"selected\"")));

    let cleared = registry
        .dispatch(
            &integration,
            HookEvent::Edited {
                taxonomy: "category",
                term_id: books.id,
                submission: &SubmittedField::Missing,
            },
        )
        .unwrap();
    assert_eq!(cleared, HookOutcome::Saved(SaveOutcome::Cleared));
}

#[test]
fn unbound_hook_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let mut registry = HookRegistry::new();
    registry
        .register(&SqliteTermRepository::new(&conn), &TaxonomySelection::default())
        .unwrap();

    let err = registry
        .dispatch(&integration(&conn), HookEvent::AddFormFields { taxonomy: "nav_menu" })
        .unwrap_err();

    assert!(matches!(err, HookError::NotBound(hook) if hook == "nav_menu_add_form_fields"));
}

#[test]
fn expand_replaces_both_embeds_and_keeps_unknown_tags() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let directory = SqliteTermRepository::new(&conn);
    let europe = directory.create_term(&NewTerm::new("category", "Europe")).unwrap();
    let travel = directory.create_term(&NewTerm::new("category", "Travel")).unwrap();
    AssociationStore::new(SqliteTermMetaRepository::new(&conn))
        .set(europe.id, &BTreeSet::from([travel.id]))
        .unwrap();
    SqlitePostRepository::new(&conn)
        .create_post(
            &NewPost::published("Night train", 10, vec![europe.id, travel.id])
                .with_slug("night-train"),
        )
        .unwrap();

    let associations = AssociationRenderer::new(
        SqliteTermRepository::new(&conn),
        AssociationStore::new(SqliteTermMetaRepository::new(&conn)),
    );
    let posts = CrossTermPostQuery::new(
        SqliteTermRepository::new(&conn),
        SqlitePostRepository::new(&conn),
    );
    let embeds = EmbedRenderer::new(&associations, &posts);

    let content = format!(
        "intro [related_terms id=\"{}\" taxonomy=\"category\"] middle \
         [posts_by_related_terms parent='{}' child=\"{}\" taxonomy=category] [gallery ids=\"1\"] end",
        europe.id, europe.id, travel.id
    );
    let expanded = embeds.expand(&content);

    assert!(expanded.starts_with("intro <div class=\"associated-terms-wrapper\">"));
    assert!(expanded.contains("<a href=\"http://localhost/category/travel/\">Travel</a>"));
    assert!(expanded.contains("<a href=\"http://localhost/night-train/\">Night train</a>"));
    assert!(expanded.contains("[gallery ids=\"1\"]"));
    assert!(expanded.ends_with(" end"));
}

#[test]
fn embeds_use_defaults_for_missing_attributes() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let associations = AssociationRenderer::new(
        SqliteTermRepository::new(&conn),
        AssociationStore::new(SqliteTermMetaRepository::new(&conn)),
    );
    let posts = CrossTermPostQuery::new(
        SqliteTermRepository::new(&conn),
        SqlitePostRepository::new(&conn),
    );
    let embeds = EmbedRenderer::new(&associations, &posts);

    assert_eq!(
        embeds.render_embed("related_terms", &parse_attributes("")),
        Some("<p>Invalid term ID or taxonomy.</p>".to_string())
    );
    assert_eq!(
        embeds.expand("[posts_by_related_terms]"),
        "<p>Invalid parent or child terms provided, or invalid taxonomy.</p>"
    );
    assert_eq!(embeds.render_embed("gallery", &parse_attributes("")), None);
}

#[test]
fn unclosed_bracket_before_embed_does_not_swallow_it() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let europe = SqliteTermRepository::new(&conn)
        .create_term(&NewTerm::new("category", "Europe"))
        .unwrap();
    let associations = AssociationRenderer::new(
        SqliteTermRepository::new(&conn),
        AssociationStore::new(SqliteTermMetaRepository::new(&conn)),
    );
    let posts = CrossTermPostQuery::new(
        SqliteTermRepository::new(&conn),
        SqlitePostRepository::new(&conn),
    );
    let embeds = EmbedRenderer::new(&associations, &posts);

    let expanded = embeds.expand(&format!(
        "Prices [see note [related_terms id=\"{}\" taxonomy=\"category\"]",
        europe.id
    ));

    assert!(expanded.starts_with("Prices [see note <div class=\"associated-terms-wrapper\">"));
    assert!(expanded.contains("<h2>Europe</h2>"));
}

#[test]
fn storage_failure_renders_embed_as_empty_string() {
    let conn = open_db_in_memory().unwrap();
    register_taxonomies(&conn);
    let europe = SqliteTermRepository::new(&conn)
        .create_term(&NewTerm::new("category", "Europe"))
        .unwrap();
    conn.execute_batch("DROP TABLE term_meta;").unwrap();
    let associations = AssociationRenderer::new(
        SqliteTermRepository::new(&conn),
        AssociationStore::new(SqliteTermMetaRepository::new(&conn)),
    );
    let posts = CrossTermPostQuery::new(
        SqliteTermRepository::new(&conn),
        SqlitePostRepository::new(&conn),
    );

    let expanded = EmbedRenderer::new(&associations, &posts).expand(&format!(
        "a [related_terms id=\"{}\" taxonomy=\"category\"] b",
        europe.id
    ));

    assert_eq!(expanded, "a  b");
}
