use chrono::NaiveDate;
use nomenclature_core::db::open_db_in_memory;
use nomenclature_core::{
    DeclarableCodeEntry, HierarchyPathError, NomenclatureEntry, NomenclatureRepository,
    RepoError, SectionBinding, SectionDescription, SqliteNomenclatureRepository,
};

fn entry(goods_code: &str, hier_pos: u32, indent: u32, language: &str, description: &str) -> NomenclatureEntry {
    NomenclatureEntry {
        goods_code: goods_code.to_string(),
        start_date: NaiveDate::from_ymd_opt(2000, 1, 1),
        end_date: None,
        language: language.to_string(),
        hier_pos,
        indent,
        description: description.to_string(),
        descr_start_date: None,
    }
}

fn bind_live_animals(repo: &SqliteNomenclatureRepository<'_>) {
    repo.upsert_section_binding(&SectionBinding {
        chapter: 1,
        section_number: 1,
    })
    .unwrap();
    repo.upsert_section_description(&SectionDescription {
        section_number: 1,
        language: "EN".to_string(),
        name: "Live animals; animal products".to_string(),
    })
    .unwrap();
}

#[test]
fn upsert_builds_hierarchy_path_and_keeps_one_item_per_code() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();

    let en = repo
        .upsert_nomenclature(&entry("0101210000 80", 6, 2, "EN", "Pure-bred breeding animals"))
        .unwrap();
    let lt = repo
        .upsert_nomenclature(&entry("0101210000 80", 6, 2, "LT", "Grynaveisliai veisliniai gyvūnai"))
        .unwrap();
    assert_eq!(en, lt);

    let records = repo.list_index_page(10, 0).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].language, "EN");
    assert_eq!(records[1].language, "LT");
    assert!(records
        .iter()
        .all(|record| record.hierarchy_path == "01.0101.010121" && record.hier_pos == 6));
}

#[test]
fn reingesting_updates_path_indent_and_description() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();

    repo.upsert_nomenclature(&entry("0101210000 80", 6, 2, "EN", "old text"))
        .unwrap();
    repo.upsert_nomenclature(&entry("0101210000 80", 4, 1, "EN", "new text"))
        .unwrap();

    let records = repo.list_index_page(10, 0).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].hierarchy_path, "01.0101");
    assert_eq!(records[0].indent, 1);
    assert_eq!(records[0].description, "new text");
}

#[test]
fn invalid_level_is_reported_with_goods_code() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();

    let err = repo
        .upsert_nomenclature(&entry("0101210000 80", 5, 0, "EN", "odd level"))
        .unwrap_err();
    match err {
        RepoError::HierarchyPath { goods_code, source } => {
            assert_eq!(goods_code, "0101210000 80");
            assert_eq!(source, HierarchyPathError::InvalidLevel(5));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn declarable_code_attaches_to_known_goods_code_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();
    repo.upsert_nomenclature(&entry("0101210000 80", 6, 2, "EN", "Pure-bred"))
        .unwrap();

    let date = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
    let known = DeclarableCodeEntry {
        goods_code: "0101210000 80".to_string(),
        start_date: date,
        decl_start_date: date,
        is_leaf: true,
    };
    let unknown = DeclarableCodeEntry {
        goods_code: "9999999999 80".to_string(),
        ..known.clone()
    };

    assert!(repo.upsert_declarable_code(&known).unwrap());
    assert!(!repo.upsert_declarable_code(&unknown).unwrap());

    let records = repo.list_index_page(10, 0).unwrap();
    assert_eq!(records[0].is_leaf, Some(true));
    assert!(records[0].is_declarable());
}

#[test]
fn scan_keeps_rows_without_section_binding() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();
    bind_live_animals(&repo);

    repo.upsert_nomenclature(&entry("0101000000 80", 4, 1, "EN", "Horses"))
        .unwrap();
    repo.upsert_nomenclature(&entry("9701000000 80", 4, 1, "EN", "Paintings"))
        .unwrap();

    let records = repo.list_index_page(10, 0).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].section_number, Some(1));
    assert_eq!(
        records[0].section_name.as_deref(),
        Some("Live animals; animal products")
    );
    assert_eq!(records[1].goods_code, "9701000000 80");
    assert_eq!(records[1].section_number, None);
    assert_eq!(records[1].section_name, None);
    assert_eq!(records[1].is_leaf, None);
}

#[test]
fn section_name_follows_record_language() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();
    bind_live_animals(&repo);

    // Bound chapter, but no LT section name.
    repo.upsert_nomenclature(&entry("0101000000 80", 4, 1, "LT", "Arkliai"))
        .unwrap();

    let records = repo.list_index_page(10, 0).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].section_name, None);
}

#[test]
fn scan_pages_are_disjoint_and_complete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();

    let codes = ["0101000000 80", "0102000000 80", "0103000000 80", "0104000000 80", "0105000000 80"];
    for code in codes {
        repo.upsert_nomenclature(&entry(code, 4, 1, "EN", code)).unwrap();
    }

    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let page = repo.list_index_page(2, offset).unwrap();
        if page.is_empty() {
            break;
        }
        offset += page.len() as u32;
        seen.extend(page.into_iter().map(|record| record.goods_code));
    }

    assert_eq!(seen, codes);
}

#[test]
fn section_descriptions_are_sorted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNomenclatureRepository::try_new(&conn).unwrap();

    for (number, language, name) in [(2, "EN", "Vegetable products"), (1, "LT", "Gyvi gyvūnai"), (1, "EN", "Live animals")] {
        repo.upsert_section_description(&SectionDescription {
            section_number: number,
            language: language.to_string(),
            name: name.to_string(),
        })
        .unwrap();
    }

    let sections = repo.list_section_descriptions().unwrap();
    let keys = sections
        .iter()
        .map(|section| (section.section_number, section.language.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(keys, vec![(1, "EN"), (1, "LT"), (2, "EN")]);
}
