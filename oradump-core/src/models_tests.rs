//! Tests for the catalog models.

use super::*;

#[test]
fn test_object_type_mapping_is_total() {
    for object_type in ObjectType::ALL {
        assert!(!object_type.label().is_empty());
        assert!(!object_type.extension().is_empty());
        assert!(!object_type.folder().is_empty());
        assert_eq!(object_type.label().parse::<ObjectType>().ok(), Some(object_type));
    }
}

#[test]
fn test_object_type_extensions_and_folders() {
    let expected = [
        (ObjectType::Type, "tps", "types"),
        (ObjectType::TypeBody, "tpb", "types"),
        (ObjectType::Function, "fnc", "functions"),
        (ObjectType::Procedure, "prc", "procedures"),
        (ObjectType::Package, "spc", "packages"),
        (ObjectType::PackageBody, "bdy", "packages"),
        (ObjectType::Trigger, "trg", "triggers"),
        (ObjectType::Sequence, "seq", "sequences"),
        (ObjectType::Index, "idx", "indexes"),
        (ObjectType::Synonym, "sql", "synonyms"),
        (ObjectType::Lob, "lob", "lobs"),
        (ObjectType::JavaClass, "class", "classes"),
        (ObjectType::View, "sql", "views"),
        (ObjectType::Table, "sql", "tables"),
    ];

    for (object_type, extension, folder) in expected {
        assert_eq!(object_type.extension(), extension, "{object_type}");
        assert_eq!(object_type.folder(), folder, "{object_type}");
    }
}

#[test]
fn test_unknown_label_does_not_resolve() {
    assert!("DATABASE LINK".parse::<ObjectType>().is_err());
    assert!("TABLE PARTITION".parse::<ObjectType>().is_err());
    let error = DbObject::new("MATERIALIZED VIEW", "MV_SALES").kind().unwrap_err();
    assert_eq!(error.to_string(), "Unsupported object: MATERIALIZED VIEW MV_SALES");
    assert_eq!(
        DbObject::new("PACKAGE BODY", "PKG_UTIL").kind().ok(),
        Some(ObjectType::PackageBody)
    );
}

#[test]
fn test_dump_methods() {
    assert_eq!(ObjectType::Trigger.dump_method(), DumpMethod::Source);
    assert_eq!(ObjectType::TypeBody.dump_method(), DumpMethod::Source);
    assert_eq!(ObjectType::Synonym.dump_method(), DumpMethod::GeneratedDdl);
    assert_eq!(ObjectType::Table.dump_method(), DumpMethod::Table);
    assert_eq!(ObjectType::View.dump_method(), DumpMethod::View);
    assert_eq!(ObjectType::Lob.dump_method(), DumpMethod::NotDumped);
    assert_eq!(ObjectType::JavaClass.dump_method(), DumpMethod::NotDumped);
}

#[test]
fn test_relative_path() {
    assert_eq!(
        ObjectType::PackageBody.relative_path("PKG_UTIL"),
        "packages/PKG_UTIL.bdy"
    );
    assert_eq!(ObjectType::Table.relative_path("EMP"), "tables/EMP.sql");
}

#[test]
fn test_object_type_serializes_as_catalog_label() {
    let json = serde_json::to_string(&ObjectType::TypeBody).unwrap();
    assert_eq!(json, "\"TYPE BODY\"");

    let parsed: ObjectType = serde_json::from_str("\"JAVA CLASS\"").unwrap();
    assert_eq!(parsed, ObjectType::JavaClass);
}

#[test]
fn test_recycle_bin_names() {
    assert!(is_recycle_bin_name("BIN$k2Vh0mSwQx6pV0n3Fz2m1Q==$0"));
    assert!(!is_recycle_bin_name("BINARY_DATA"));
    assert!(!is_recycle_bin_name("EMP"));
}

#[test]
fn test_constraint_kind_codes() {
    assert_eq!(ConstraintKind::from_code("P"), Some(ConstraintKind::PrimaryKey));
    assert_eq!(ConstraintKind::from_code("U"), Some(ConstraintKind::Unique));
    assert_eq!(ConstraintKind::from_code("R"), Some(ConstraintKind::ForeignKey));
    assert_eq!(ConstraintKind::from_code("C"), None);
    assert_eq!(ConstraintKind::ForeignKey.keyword(), "foreign key");
}

#[test]
fn test_temporary_duration() {
    assert_eq!(
        TemporaryDuration::from_catalog("SYS$TRANSACTION"),
        Some(TemporaryDuration::Transaction)
    );
    assert_eq!(
        TemporaryDuration::from_catalog("SYS$SESSION"),
        Some(TemporaryDuration::Session)
    );
    assert_eq!(TemporaryDuration::from_catalog(""), None);
}
