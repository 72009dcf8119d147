//! Schema casing rewriter
//!
//! Rewrites a Prisma schema file from snake_case naming to the casing Prisma
//! recommends: PascalCase model names and camelCase field names. Every rename
//! is pinned back to the stored name with a `@@map`/`@map` directive, so the
//! rewrite changes the Prisma client surface without touching the database.
//! Models owned by the migration tooling are dropped from the file outright.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::utils::naming;

/// Built-in scalar types. A field of one of these maps to a plain column;
/// anything else in type position is a reference to another model.
const SCALAR_TYPES: &[&str] = &["String", "Boolean", "Int", "Float", "DateTime"];

/// Models that belong to the migration tooling, not the application.
const MIGRATION_TRACKING_MODELS: &[&str] =
    &["knex_migrations", "knex_migrations_lock", "pgmigrations"];

static MODEL_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^model (\w+) \{$").unwrap());
static BLOCK_DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+@@").unwrap());
static MAP_DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*@@map\(").unwrap());
static FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s(\w+)\s+(\w+)(\[\])?").unwrap());
static FIELD_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s\w+\s+(\w+)").unwrap());
static RELATION_FIELDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"fields:\s\[([\w,\s]+)\]").unwrap());
static CONSTRAINT_FIELDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@@\w+\(\[([\w,\s]+)\]").unwrap());

/// Scan position relative to model blocks.
enum BlockState {
    /// Between blocks; lines pass through untouched.
    Outside,
    /// Inside a model block that stays in the output.
    Retained {
        /// The model's name as it appeared in the input.
        original: String,
        /// Whether the block already carries its `@@map` directive.
        mapped: bool,
    },
    /// Inside a migration-tracking block. Lines are dropped until the next
    /// model header, which also swallows the blank lines that followed the
    /// block.
    Suppressed,
}

/// What a rewrite pass changed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RewriteStats {
    /// Renamed models, original name to new name, in order of appearance.
    pub renamed_models: IndexMap<String, String>,
    /// Migration-tracking blocks dropped from the output.
    pub dropped_models: usize,
    /// Field lines that gained a column `@map` directive.
    pub remapped_fields: usize,
}

/// Line-oriented rewriter for Prisma schema files.
pub struct SchemaRewriter;

impl SchemaRewriter {
    /// Create a new rewriter.
    pub fn new() -> Self {
        Self
    }

    /// Rewrite a schema file in place.
    ///
    /// The whole file is read before any rewriting starts and written back in
    /// one piece at the end. I/O errors are fatal; the structure of the
    /// schema itself is never validated.
    pub fn rewrite_file(&self, path: impl AsRef<Path>) -> Result<RewriteStats> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let (fixed, stats) = self.rewrite(&text);
        fs::write(path, fixed)?;
        Ok(stats)
    }

    /// Rewrite schema text, returning the new text and what changed.
    pub fn rewrite(&self, text: &str) -> (String, RewriteStats) {
        let mut out: Vec<String> = Vec::new();
        let mut stats = RewriteStats::default();
        let mut state = BlockState::Outside;

        for line in text.split('\n') {
            if let Some(caps) = MODEL_OPEN.captures(line) {
                let original = caps[1].to_string();
                if MIGRATION_TRACKING_MODELS.contains(&original.as_str()) {
                    stats.dropped_models += 1;
                    state = BlockState::Suppressed;
                    continue;
                }
                let renamed = naming::to_pascal(&original);
                out.push(format!("model {} {{", renamed));
                if renamed != original {
                    stats.renamed_models.insert(original.clone(), renamed);
                }
                state = BlockState::Retained {
                    original,
                    mapped: false,
                };
                continue;
            }

            state = match state {
                BlockState::Suppressed => BlockState::Suppressed,
                BlockState::Outside => {
                    out.push(line.to_string());
                    BlockState::Outside
                }
                BlockState::Retained { original, mut mapped } => {
                    if !mapped && (line == "}" || BLOCK_DIRECTIVE.is_match(line)) {
                        if MAP_DIRECTIVE.is_match(line) {
                            // An existing @@map counts as the block's one
                            // directive; nothing new is inserted.
                            mapped = true;
                        } else {
                            if line == "}" {
                                out.push(String::new());
                            }
                            out.push(format!("  @@map(\"{}\")", original));
                            mapped = true;
                        }
                    }

                    out.push(self.rewrite_member(line, &mut stats));

                    if line == "}" {
                        BlockState::Outside
                    } else {
                        BlockState::Retained { original, mapped }
                    }
                }
            };
        }

        (out.join("\n"), stats)
    }

    /// Apply the field-level rewrite rules to one line of a retained block.
    ///
    /// Rules run in a fixed order: field name (with pluralization of array
    /// relations and a `@map` for renamed scalar columns), then the field
    /// type token, then the identifier lists inside `@relation` and
    /// `@@index`/`@@unique` directives.
    fn rewrite_member(&self, line: &str, stats: &mut RewriteStats) -> String {
        let mut fixed = line.to_string();

        if let Some(caps) = FIELD.captures(line) {
            let name = &caps[1];
            let type_name = &caps[2];
            let is_array = caps.get(3).is_some();

            let mut new_name = naming::to_camel(name);
            if is_array && !naming::is_plural(&new_name) {
                new_name = naming::pluralize(&new_name);
            }
            fixed = fixed.replacen(name, &new_name, 1);

            // A renamed scalar column needs an explicit map back to the
            // stored name. A model reference is a schema-level name only, so
            // it gets none.
            if name.contains('_') && SCALAR_TYPES.contains(&type_name) {
                fixed = format!("{} @map(\"{}\")", fixed, name);
                stats.remapped_fields += 1;
            }
        }

        // Model references in type position follow the model rename. Scalar
        // type tokens hit this too; pascal-casing them is a no-op.
        let type_span = FIELD_TYPE
            .captures(&fixed)
            .and_then(|caps| caps.get(1))
            .map(|m| (m.range(), naming::to_pascal(m.as_str())));
        if let Some((range, new_type)) = type_span {
            fixed.replace_range(range, &new_type);
        }

        let relation_span = RELATION_FIELDS
            .captures(&fixed)
            .and_then(|caps| caps.get(1))
            .map(|m| (m.range(), camel_case_list(m.as_str())));
        if let Some((range, fields)) = relation_span {
            fixed.replace_range(range, &fields);
        }

        let constraint_span = CONSTRAINT_FIELDS
            .captures(&fixed)
            .and_then(|caps| caps.get(1))
            .map(|m| (m.range(), camel_case_list(m.as_str())));
        if let Some((range, fields)) = constraint_span {
            fixed.replace_range(range, &fields);
        }

        fixed
    }
}

impl Default for SchemaRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Camel-case every identifier in a `, `-separated list.
fn camel_case_list(list: &str) -> String {
    list.split(", ")
        .map(naming::to_camel)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(text: &str) -> String {
        SchemaRewriter::new().rewrite(text).0
    }

    #[test]
    fn renames_scalar_field_and_maps_the_column() {
        let out = rewrite("model user {\n  user_id Int\n}\n");
        assert!(out.contains("  userId Int @map(\"user_id\")"));
    }

    #[test]
    fn model_reference_gets_no_column_map() {
        let out = rewrite("model post {\n  author_user author_user\n}\n");
        assert!(out.contains("  authorUser AuthorUser"));
        assert!(!out.contains("@map(\"author_user\")"));
    }

    #[test]
    fn pluralizes_singular_array_relation() {
        let out = rewrite("model user {\n  post post[]\n}\n");
        assert!(out.contains("  posts Post[]"));
    }

    #[test]
    fn keeps_already_plural_array_relation() {
        let out = rewrite("model user {\n  posts post[]\n}\n");
        assert!(out.contains("  posts Post[]"));
        assert!(!out.contains("postses"));
    }

    #[test]
    fn rewrites_relation_field_list() {
        let out = rewrite(
            "model post {\n  author user @relation(fields: [author_id], references: [id])\n}\n",
        );
        assert!(out.contains("  author User @relation(fields: [authorId], references: [id])"));
    }

    #[test]
    fn rewrites_constraint_field_list() {
        let out = rewrite("model grant {\n  @@unique([role_id, resource_id])\n}\n");
        assert!(out.contains("  @@unique([roleId, resourceId])"));
    }

    #[test]
    fn map_directive_lands_before_first_block_directive() {
        let out = rewrite("model grant {\n  role_id Int\n  @@index([role_id])\n}\n");
        let expected = "model Grant {\n  roleId Int @map(\"role_id\")\n  @@map(\"grant\")\n  @@index([roleId])\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn map_directive_lands_before_closing_brace_with_blank_line() {
        let out = rewrite("model grant {\n  role_id Int\n}\n");
        let expected = "model Grant {\n  roleId Int @map(\"role_id\")\n\n  @@map(\"grant\")\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn drops_migration_tracking_models_and_their_trailing_blank_lines() {
        let input = "model user {\n  id Int\n}\n\nmodel knex_migrations {\n  id Int\n  batch Int\n}\n\nmodel role {\n  id Int\n}\n";
        let out = rewrite(input);
        assert!(!out.contains("knex_migrations"));
        assert!(!out.contains("batch"));
        // The blank line that followed the dropped block goes with it.
        assert!(out.contains("}\n\nmodel Role {"));
    }

    #[test]
    fn counts_what_changed() {
        let input = "model user {\n  user_id Int\n}\n\nmodel pgmigrations {\n  id Int\n}\n";
        let (_, stats) = SchemaRewriter::new().rewrite(input);
        assert_eq!(stats.renamed_models.get("user"), Some(&"User".to_string()));
        assert_eq!(stats.dropped_models, 1);
        assert_eq!(stats.remapped_fields, 1);
    }

    #[test]
    fn lines_outside_blocks_pass_through() {
        let input = "datasource db {\n  provider = \"postgresql\"\n}\n";
        assert_eq!(rewrite(input), input);
    }
}
