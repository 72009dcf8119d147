//! Integration tests for the schema casing rewriter

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use schema_tidy::{Error, SchemaRewriter};

const SCHEMA: &str = r#"datasource db {
  provider = "postgresql"
  url      = env("DATABASE_URL")
}

generator client {
  provider = "prisma-client-js"
}

model committee {
  id Int @id @default(autoincrement())
  name String
  logo_url String
  created_at DateTime
  members committee_member[]
}

model committee_member {
  id Int @id @default(autoincrement())
  committee_id Int
  user_id Int
  joined_at DateTime?
  committee committee @relation(fields: [committee_id], references: [id])

  @@unique([committee_id, user_id])
}

model knex_migrations {
  id Int @id
  name String
  batch Int
  migration_time DateTime
}

model access_policy {
  id Int @id @default(autoincrement())
  role String
  resource String
}
"#;

const REWRITTEN: &str = r#"datasource db {
  provider = "postgresql"
  url      = env("DATABASE_URL")
}

generator client {
  provider = "prisma-client-js"
}

model Committee {
  id Int @id @default(autoincrement())
  name String
  logoUrl String @map("logo_url")
  createdAt DateTime @map("created_at")
  members CommitteeMember[]

  @@map("committee")
}

model CommitteeMember {
  id Int @id @default(autoincrement())
  committeeId Int @map("committee_id")
  userId Int @map("user_id")
  joinedAt DateTime? @map("joined_at")
  committee Committee @relation(fields: [committeeId], references: [id])

  @@map("committee_member")
  @@unique([committeeId, userId])
}

model AccessPolicy {
  id Int @id @default(autoincrement())
  role String
  resource String

  @@map("access_policy")
}
"#;

#[test]
fn rewrites_a_full_schema() {
    let (out, stats) = SchemaRewriter::new().rewrite(SCHEMA);

    assert_eq!(out, REWRITTEN);
    assert_eq!(stats.renamed_models.len(), 3);
    assert_eq!(
        stats.renamed_models.get("committee_member"),
        Some(&"CommitteeMember".to_string())
    );
    assert_eq!(stats.dropped_models, 1);
    assert_eq!(stats.remapped_fields, 5);
}

#[test]
fn rewriting_rewritten_output_changes_nothing() {
    let rewriter = SchemaRewriter::new();
    let (once, _) = rewriter.rewrite(SCHEMA);
    let (twice, stats) = rewriter.rewrite(&once);

    assert_eq!(twice, once);
    assert!(stats.renamed_models.is_empty());
    assert_eq!(stats.dropped_models, 0);
    assert_eq!(stats.remapped_fields, 0);
}

#[test]
fn rewrites_the_file_in_place() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("schema.prisma");
    fs::write(&path, SCHEMA).expect("write schema");

    let stats = SchemaRewriter::new()
        .rewrite_file(&path)
        .expect("rewrite should succeed");

    let out = fs::read_to_string(&path).expect("read schema back");
    assert_eq!(out, REWRITTEN);
    assert_eq!(stats.dropped_models, 1);
}

#[test]
fn missing_schema_file_is_fatal() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("does_not_exist.prisma");

    let result = SchemaRewriter::new().rewrite_file(&path);
    assert!(matches!(result, Err(Error::IoError(_))));
}
