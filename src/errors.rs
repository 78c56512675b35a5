// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use crate::errors::*;` to get access to everything `error_chain!` creates.
#![allow(deprecated)]

use error_chain::*;
pub use error_chain::bail;

use crate::cells::{Direction, Position};
use crate::tiles::Tile;

error_chain! {

    foreign_links {
        Json(::serde_json::Error);
    }

    errors {
        InvalidConfiguration(reason: String) {
            description("invalid maze configuration")
            display("invalid maze configuration: {}", reason)
        }
        MissingBlueprint(tile: Tile) {
            description("no layout blueprint for a tile shape")
            display("couldn't find a blueprint for tile {} (0x{})", tile, tile.hex())
        }
        MissingPassage(position: Position, entry: Direction) {
            description("tunnel entered from a side without a passage")
            display("tunnel at {} has no passage entered from {}", position, entry)
        }
        UnreachableOrphan(orphan: Position, spawn: Position) {
            description("orphan tile still unreachable after repair")
            display("no route from orphan {} to spawn {}", orphan, spawn)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cells::{Direction, Position};
    use crate::errors::*;

    fn reject(reason: &str) -> Result<()> {
        bail!(ErrorKind::InvalidConfiguration(reason.to_owned()))
    }

    #[test]
    fn bail_is_usable_through_the_glob_import() {
        match reject("too small") {
            Err(Error(ErrorKind::InvalidConfiguration(reason), _)) => assert_eq!(reason, "too small"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn kinds_describe_themselves() {
        let e = Error::from(ErrorKind::UnreachableOrphan(Position::new(1, 2), Position::new(0, 0)));
        assert_eq!(e.to_string(), "no route from orphan (1,2) to spawn (0,0)");
        let e = Error::from(ErrorKind::MissingPassage(Position::new(3, 3), Direction::WEST));
        assert_eq!(e.to_string(), "tunnel at (3,3) has no passage entered from West");
    }
}
