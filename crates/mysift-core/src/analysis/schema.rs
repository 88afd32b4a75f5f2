//! Per-database statistics from a structural schema dump.
//!
//! Reads `mysqldump --no-data` style output line by line. `USE `db`;`
//! switches the database every following line is counted under.

use serde::Serialize;

use crate::analysis::ordered::CountGrid;
use crate::analysis::scan::{Rule, RuleSet, scan};

/// Object columns, in display order.
pub const OBJECT_COLUMNS: [&str; 7] = ["Tables", "Views", "SPs", "Trigs", "Funcs", "FKs", "Partn"];

/// Grids produced from one schema dump.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaStats {
    /// Tables, views, routines, triggers, foreign keys, partitions.
    pub objects: CountGrid,
    /// `ENGINE=` per table.
    pub engines: CountGrid,
    /// `BTREE`, `HASH`, `RTREE`, `FULLTEXT`, `SPATIAL`.
    pub index_kinds: CountGrid,
    /// Declared column types.
    pub column_types: CountGrid,
}

impl SchemaStats {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn use_database(line: &str) -> Option<&str> {
    let rest = line.trim_end().strip_prefix("USE `")?;
    rest.strip_suffix("`;")
}

/// `/*!50003 CREATE*/ ... /*!50003 PROCEDURE` or `CREATE DEFINER=... PROCEDURE`.
fn creates_routine(line: &str, kind: &str) -> bool {
    if let Some(pos) = line.find("03 CREATE") {
        let rest = &line[pos..];
        return rest
            .match_indices("03 ")
            .any(|(i, _)| rest[i + 3..].starts_with(kind));
    }
    line.starts_with("CREATE DEFINER=")
        && line
            .split_whitespace()
            .any(|word| word == kind)
}

fn table(line: &str) -> Option<&str> {
    line.starts_with("CREATE TABLE").then_some("Tables")
}

fn view(line: &str) -> Option<&str> {
    line.contains("CREATE ALGORITHM=").then_some("Views")
}

fn procedure(line: &str) -> Option<&str> {
    creates_routine(line, "PROCEDURE").then_some("SPs")
}

fn trigger(line: &str) -> Option<&str> {
    creates_routine(line, "TRIGGER").then_some("Trigs")
}

fn function(line: &str) -> Option<&str> {
    creates_routine(line, "FUNCTION").then_some("Funcs")
}

fn foreign_key(line: &str) -> Option<&str> {
    line.contains("FOREIGN KEY").then_some("FKs")
}

fn partition(line: &str) -> Option<&str> {
    line.contains("PARTITION BY").then_some("Partn")
}

/// `) ENGINE=InnoDB AUTO_INCREMENT=...` → `InnoDB`.
fn engine(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(") ENGINE=")?;
    rest.split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .filter(|name| !name.is_empty())
}

/// Index kind of any line mentioning `KEY`, by precedence.
fn index_kind(line: &str) -> Option<&str> {
    if !line.contains("KEY") {
        return None;
    }
    let kind = if line.contains("SPATIAL") {
        "SPATIAL"
    } else if line.contains("FULLTEXT") {
        "FULLTEXT"
    } else if line.contains("USING RTREE") {
        "RTREE"
    } else if line.contains("USING HASH") {
        "HASH"
    } else {
        "BTREE"
    };
    Some(kind)
}

/// `` `price` decimal(10,2) NOT NULL, `` → `decimal`.
fn column_type(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('`')?;
    let close = rest.find('`')?;
    let after = rest[close + 1..].trim_start();
    let end = after
        .find(|c: char| c == ' ' || c == ',' || c == '(')
        .unwrap_or(after.len());
    let ty = &after[..end];
    (!ty.is_empty()).then_some(ty)
}

static OBJECT_RULES: [Rule; 7] = [
    table,
    view,
    procedure,
    function,
    trigger,
    foreign_key,
    partition,
];

static RULE_SETS: [RuleSet; 4] = [
    RuleSet {
        columns: &OBJECT_COLUMNS,
        rules: &OBJECT_RULES,
    },
    RuleSet {
        columns: &[],
        rules: &[engine],
    },
    RuleSet {
        columns: &[],
        rules: &[index_kind],
    },
    RuleSet {
        columns: &[],
        rules: &[column_type],
    },
];

/// Scan a schema dump in one pass.
pub fn aggregate<'l, I>(lines: I) -> SchemaStats
where
    I: IntoIterator<Item = &'l str>,
{
    let mut grids = scan(lines, use_database, &RULE_SETS).into_iter();
    SchemaStats {
        objects: grids.next().unwrap_or_default(),
        engines: grids.next().unwrap_or_default(),
        index_kinds: grids.next().unwrap_or_default(),
        column_types: grids.next().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
USE `shop`;
CREATE TABLE `orders` (
  `id` int NOT NULL AUTO_INCREMENT,
  `customer_id` int NOT NULL,
  `total` decimal(10,2) DEFAULT NULL,
  `note` text,
  PRIMARY KEY (`id`),
  KEY `customer_id` (`customer_id`),
  FULLTEXT KEY `ft_note` (`note`),
  CONSTRAINT `fk_customer` FOREIGN KEY (`customer_id`) REFERENCES `customers` (`id`)
) ENGINE=InnoDB AUTO_INCREMENT=42 DEFAULT CHARSET=utf8mb4;
CREATE TABLE `sessions` (
  `token` varchar(64) NOT NULL,
  KEY `tok` (`token`) USING HASH
) ENGINE=MEMORY DEFAULT CHARSET=utf8mb4
/*!50100 PARTITION BY KEY (token) PARTITIONS 4 */;
/*!50001 CREATE ALGORITHM=UNDEFINED */
DELIMITER ;;
/*!50003 CREATE*/ /*!50020 DEFINER=`root`@`localhost`*/ /*!50003 PROCEDURE `refresh`() BEGIN END */;;
/*!50003 CREATE*/ /*!50017 DEFINER=`root`@`localhost`*/ /*!50003 TRIGGER `orders_ai` AFTER INSERT ON `orders` FOR EACH ROW SET @x = 1 */;;
CREATE DEFINER=`root`@`localhost` FUNCTION `tax`(x int) RETURNS int
DELIMITER ;
USE `logs`;
CREATE TABLE `events` (
  `at` datetime NOT NULL,
  SPATIAL KEY `where` (`pos`)
) ENGINE=MyISAM;
USE `empty`;
";

    #[test]
    fn test_minimal_dump() {
        let stats = aggregate(["USE `app`;", "CREATE TABLE t1 (...)", ") ENGINE=InnoDB"]);
        assert_eq!(stats.objects.get("app", "Tables"), 1);
        assert_eq!(stats.engines.get("app", "InnoDB"), 1);
    }

    #[test]
    fn test_object_counts() {
        let stats = aggregate(DUMP.lines());
        assert_eq!(stats.objects.get("shop", "Tables"), 2);
        assert_eq!(stats.objects.get("shop", "Views"), 1);
        assert_eq!(stats.objects.get("shop", "SPs"), 1);
        assert_eq!(stats.objects.get("shop", "Trigs"), 1);
        assert_eq!(stats.objects.get("shop", "Funcs"), 1);
        assert_eq!(stats.objects.get("shop", "FKs"), 1);
        assert_eq!(stats.objects.get("shop", "Partn"), 1);
        assert_eq!(stats.objects.get("logs", "Tables"), 1);
        assert_eq!(stats.objects.get("logs", "SPs"), 0);
    }

    #[test]
    fn test_databases_registered_in_discovery_order() {
        let stats = aggregate(DUMP.lines());
        assert_eq!(stats.objects.rows().collect::<Vec<_>>(), vec!["shop", "logs", "empty"]);
        assert_eq!(stats.engines.sorted_rows(), vec!["empty", "logs", "shop"]);
    }

    #[test]
    fn test_engines() {
        let stats = aggregate(DUMP.lines());
        assert_eq!(
            stats.engines.columns().collect::<Vec<_>>(),
            vec!["InnoDB", "MEMORY", "MyISAM"]
        );
        assert_eq!(stats.engines.get("shop", "MEMORY"), 1);
        assert_eq!(stats.engines.get("logs", "MyISAM"), 1);
        assert_eq!(stats.engines.get("empty", "InnoDB"), 0);
    }

    #[test]
    fn test_index_kinds() {
        let stats = aggregate(DUMP.lines());
        // PRIMARY, plain KEY, the FK constraint and PARTITION BY KEY are BTREE.
        assert_eq!(stats.index_kinds.get("shop", "BTREE"), 4);
        assert_eq!(stats.index_kinds.get("shop", "FULLTEXT"), 1);
        assert_eq!(stats.index_kinds.get("shop", "HASH"), 1);
        assert_eq!(stats.index_kinds.get("logs", "SPATIAL"), 1);
    }

    #[test]
    fn test_index_kind_precedence() {
        assert_eq!(index_kind("  SPATIAL KEY `g` (`g`) USING RTREE"), Some("SPATIAL"));
        assert_eq!(index_kind("  KEY `g` (`g`) USING RTREE"), Some("RTREE"));
        assert_eq!(index_kind("  UNIQUE KEY `u` (`u`) USING HASH"), Some("HASH"));
        assert_eq!(index_kind("  `api_KEY` varchar(10)"), Some("BTREE"));
        assert_eq!(index_kind("  `api_key` varchar(10)"), None);
    }

    #[test]
    fn test_every_key_line_counts() {
        let stats = aggregate([
            "USE `a`;",
            "/*!50100 PARTITION BY KEY (id) PARTITIONS 4 */;",
            "  `api_KEY` varchar(10) NOT NULL,",
        ]);
        assert_eq!(stats.index_kinds.get("a", "BTREE"), 2);
        assert_eq!(stats.objects.get("a", "Partn"), 1);
    }

    #[test]
    fn test_column_types() {
        let stats = aggregate(DUMP.lines());
        assert_eq!(stats.column_types.get("shop", "int"), 2);
        assert_eq!(stats.column_types.get("shop", "decimal"), 1);
        assert_eq!(stats.column_types.get("shop", "text"), 1);
        assert_eq!(stats.column_types.get("shop", "varchar"), 1);
        assert_eq!(stats.column_types.get("logs", "datetime"), 1);
    }

    #[test]
    fn test_column_type_extraction() {
        assert_eq!(column_type("  `note` text,"), Some("text"));
        assert_eq!(column_type("  `my col` enum('a','b') NOT NULL"), Some("enum"));
        assert_eq!(column_type("  `bad`"), None);
        assert_eq!(column_type("CREATE TABLE `t` ("), None);
    }

    #[test]
    fn test_empty_dump() {
        assert!(aggregate(std::iter::empty()).is_empty());
    }
}
