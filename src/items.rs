//! Items of checklists, radiolists, menus, build lists and tree views.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Off,
    On,
    Unavailable,
}

impl ItemState {
    /// Interprets a status word. Items with an empty tag are never
    /// selectable.
    pub fn from_status(status: &str, tag: &str) -> Self {
        if tag.is_empty() || status.eq_ignore_ascii_case("unavailable") {
            ItemState::Unavailable
        } else if status.eq_ignore_ascii_case("on") {
            ItemState::On
        } else {
            ItemState::Off
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub tag: String,
    pub name: String,
    pub tip: Option<String>,
    pub state: ItemState,
}

impl ListItem {
    pub fn is_available(&self) -> bool {
        self.state != ItemState::Unavailable
    }

    pub fn is_on(&self) -> bool {
        self.state == ItemState::On
    }
}

/// Which columns each item row carries on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLayout {
    /// A status word follows the name (checklist, radiolist).
    pub status: bool,
    /// A tooltip follows (`--item-help`).
    pub help: bool,
}

impl ItemLayout {
    pub fn arity(self) -> usize {
        2 + usize::from(self.status) + usize::from(self.help)
    }
}

/// Groups the trailing arguments of a list box into items.
pub fn parse_items(args: &[String], layout: ItemLayout) -> Result<Vec<ListItem>, Error> {
    let arity = layout.arity();
    if args.is_empty() || args.len() % arity != 0 {
        return Err(Error::Usage(format!(
            "expected item rows of {arity} arguments, got {} argument(s)",
            args.len()
        )));
    }

    let items = args
        .chunks_exact(arity)
        .map(|row| {
            let tag = row[0].clone();
            let name = row[1].clone();
            let state = if layout.status {
                ItemState::from_status(&row[2], &tag)
            } else {
                ItemState::from_status("", &tag)
            };
            let tip = layout.help.then(|| row[arity - 1].clone());
            ListItem {
                tag,
                name,
                tip,
                state,
            }
        })
        .collect();

    Ok(items)
}

/// Flips a checklist item. Returns whether anything changed.
pub fn toggle(items: &mut [ListItem], index: usize) -> bool {
    let Some(item) = items.get_mut(index) else {
        return false;
    };
    item.state = match item.state {
        ItemState::Off => ItemState::On,
        ItemState::On => ItemState::Off,
        ItemState::Unavailable => return false,
    };
    true
}

/// Makes `index` the only selected radiolist item.
pub fn select_only(items: &mut [ListItem], index: usize) -> bool {
    if !items.get(index).is_some_and(ListItem::is_available) {
        return false;
    }
    for (i, item) in items.iter_mut().enumerate() {
        if item.is_available() {
            item.state = if i == index { ItemState::On } else { ItemState::Off };
        }
    }
    true
}

/// Keeps only the first item marked on, as a radio group can hold just one.
pub fn normalize_radio(items: &mut [ListItem]) {
    let mut seen = false;
    for item in items.iter_mut().filter(|i| i.is_on()) {
        if seen {
            item.state = ItemState::Off;
        }
        seen = true;
    }
}

/// Index of the item whose tag matches `--default-item`, or of the first
/// available one.
pub fn initial_index(items: &[ListItem], default_item: Option<&str>) -> Option<usize> {
    default_item
        .and_then(|tag| items.iter().position(|i| i.tag == tag && i.is_available()))
        .or_else(|| items.iter().position(ListItem::is_available))
}

/// The result line(s) for the selected items; empty when nothing is
/// selected.
pub fn format_selection(items: &[ListItem], separator: &str, separate_output: bool) -> String {
    let tags: Vec<&str> = items.iter().filter(|i| i.is_on()).map(|i| i.tag.as_str()).collect();
    if tags.is_empty() {
        return String::new();
    }
    let separator = if separate_output { "\n" } else { separator };
    let mut out = tags.join(separator);
    out.push('\n');
    out
}

/// Deepest level a tree view item may sit at.
pub const MAX_TREE_DEPTH: usize = 24;

/// A tree view row: a list item and its level, 0 for the roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub item: ListItem,
    pub depth: usize,
}

/// Groups the trailing arguments of a tree view: tag, name, status and
/// depth, then the tooltip with `--item-help`. Every item is at most one
/// level below the one before it.
pub fn parse_tree_items(args: &[String], help: bool) -> Result<Vec<TreeItem>, Error> {
    let arity = 4 + usize::from(help);
    if args.is_empty() || args.len() % arity != 0 {
        return Err(Error::Usage(format!(
            "expected tree rows of {arity} arguments, got {} argument(s)",
            args.len()
        )));
    }

    let mut items = Vec::with_capacity(args.len() / arity);
    let mut previous: Option<usize> = None;
    for row in args.chunks_exact(arity) {
        let depth: usize = row[3]
            .trim()
            .parse()
            .map_err(|_| Error::Usage(format!("invalid tree depth {:?}", row[3])))?;
        if depth > MAX_TREE_DEPTH {
            return Err(Error::Usage(format!(
                "tree depth {depth} is deeper than the maximum of {MAX_TREE_DEPTH}"
            )));
        }
        if depth > previous.map_or(0, |d| d + 1) {
            return Err(Error::Usage(format!(
                "tree item {:?} skips a level (depth {depth})",
                row[0]
            )));
        }
        previous = Some(depth);
        items.push(TreeItem {
            item: ListItem {
                tag: row[0].clone(),
                name: row[1].clone(),
                tip: help.then(|| row[4].clone()),
                state: ItemState::from_status(&row[2], &row[0]),
            },
            depth,
        });
    }
    Ok(items)
}

/// Whether the tree item at `index` has children.
pub fn has_children(items: &[TreeItem], index: usize) -> bool {
    match (items.get(index), items.get(index + 1)) {
        (Some(item), Some(next)) => next.depth > item.depth,
        _ => false,
    }
}

/// Index of the parent of the tree item at `index`.
pub fn parent(items: &[TreeItem], index: usize) -> Option<usize> {
    let depth = items.get(index)?.depth;
    items[..index].iter().rposition(|i| i.depth < depth)
}

/// The two columns of a build list: items still to choose on the left,
/// chosen items on the right in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildList {
    items: Vec<ListItem>,
    chosen: Vec<usize>,
}

impl BuildList {
    /// Items marked on start in the chosen column.
    pub fn new(items: Vec<ListItem>) -> Self {
        let chosen = items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.is_on())
            .map(|(n, _)| n)
            .collect();
        Self {
            items,
            chosen,
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Indices of the items left to choose, in command line order.
    pub fn available(&self) -> Vec<usize> {
        (0..self.items.len()).filter(|n| !self.chosen.contains(n)).collect()
    }

    /// Indices of the chosen items.
    pub fn chosen(&self) -> &[usize] {
        &self.chosen
    }

    /// Moves item `index` to the end of the chosen column.
    pub fn add(&mut self, index: usize) -> bool {
        let movable = self.items.get(index).is_some_and(ListItem::is_available);
        if !movable || self.chosen.contains(&index) {
            return false;
        }
        self.chosen.push(index);
        true
    }

    /// Moves item `index` back to the left column.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(pos) = self.chosen.iter().position(|&n| n == index) else {
            return false;
        };
        self.chosen.remove(pos);
        true
    }

    /// Chosen tags joined by `separator`, or nothing when none is chosen.
    pub fn format_chosen(&self, separator: &str) -> String {
        if self.chosen.is_empty() {
            return String::new();
        }
        let tags: Vec<&str> = self.chosen.iter().map(|&n| self.items[n].tag.as_str()).collect();
        let mut out = tags.join(separator);
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const CHECK: ItemLayout = ItemLayout {
        status: true,
        help: false,
    };

    #[test]
    fn status_words() {
        assert_eq!(ItemState::from_status("on", "a"), ItemState::On);
        assert_eq!(ItemState::from_status("ON", "a"), ItemState::On);
        assert_eq!(ItemState::from_status("off", "a"), ItemState::Off);
        assert_eq!(ItemState::from_status("whatever", "a"), ItemState::Off);
        assert_eq!(ItemState::from_status("unavailable", "a"), ItemState::Unavailable);
        assert_eq!(ItemState::from_status("on", ""), ItemState::Unavailable);
    }

    #[test]
    fn parses_rows() {
        let items = parse_items(&args(&["1", "Apple", "on", "2", "Pear", "off"]), CHECK).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tag, "1");
        assert_eq!(items[0].name, "Apple");
        assert!(items[0].is_on());
        assert_eq!(items[1].state, ItemState::Off);
        assert_eq!(items[1].tip, None);
    }

    #[test]
    fn parses_menu_rows_with_help() {
        let layout = ItemLayout {
            status: false,
            help: true,
        };
        let items = parse_items(&args(&["a", "Alpha", "first", "", "----", ""]), layout).unwrap();
        assert_eq!(items[0].tip.as_deref(), Some("first"));
        assert_eq!(items[0].state, ItemState::Off);
        assert_eq!(items[1].state, ItemState::Unavailable);
    }

    #[test]
    fn wrong_arity_is_a_usage_error() {
        let err = parse_items(&args(&["1", "Apple"]), CHECK).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
        assert!(matches!(parse_items(&[], CHECK), Err(Error::Usage(_))));
    }

    #[test]
    fn toggle_skips_unavailable() {
        let mut items =
            parse_items(&args(&["1", "A", "off", "2", "B", "unavailable"]), CHECK).unwrap();
        assert!(toggle(&mut items, 0));
        assert!(items[0].is_on());
        assert!(!toggle(&mut items, 1));
        assert!(!toggle(&mut items, 7));
    }

    #[test]
    fn radio_selection_is_exclusive() {
        let mut items =
            parse_items(&args(&["1", "A", "on", "2", "B", "on", "3", "C", "off"]), CHECK).unwrap();
        normalize_radio(&mut items);
        assert_eq!(items.iter().filter(|i| i.is_on()).count(), 1);
        assert!(items[0].is_on());

        assert!(select_only(&mut items, 2));
        assert!(!items[0].is_on());
        assert!(items[2].is_on());
    }

    #[test]
    fn default_item_lookup() {
        let items =
            parse_items(&args(&["", "A", "off", "b", "B", "off", "c", "C", "off"]), CHECK).unwrap();
        assert_eq!(initial_index(&items, Some("c")), Some(2));
        assert_eq!(initial_index(&items, Some("zz")), Some(1));
        assert_eq!(initial_index(&items, None), Some(1));
    }

    #[test]
    fn selection_output() {
        let items =
            parse_items(&args(&["1", "A", "on", "2", "B", "off", "3", "C", "on"]), CHECK).unwrap();
        assert_eq!(format_selection(&items, "/", false), "1/3\n");
        assert_eq!(format_selection(&items, "|", false), "1|3\n");
        assert_eq!(format_selection(&items, "/", true), "1\n3\n");
    }

    #[test]
    fn empty_selection_prints_nothing() {
        let items = parse_items(&args(&["1", "A", "off"]), CHECK).unwrap();
        assert_eq!(format_selection(&items, "/", false), "");
        assert_eq!(format_selection(&items, "/", true), "");
    }

    #[test]
    fn tree_rows_carry_their_depth() {
        let items = parse_tree_items(
            &args(&["a", "Root", "off", "0", "b", "Child", "on", "1", "c", "Leaf", "off", "2",
                "d", "Next root", "off", "0"]),
            false,
        )
        .unwrap();
        let depths: Vec<usize> = items.iter().map(|i| i.depth).collect();
        assert_eq!(depths, [0, 1, 2, 0]);
        assert!(items[1].item.is_on());
        assert!(has_children(&items, 0));
        assert!(!has_children(&items, 2));
        assert!(!has_children(&items, 3));
        assert_eq!(parent(&items, 2), Some(1));
        assert_eq!(parent(&items, 3), None);
    }

    #[test]
    fn tree_rows_with_help() {
        let items =
            parse_tree_items(&args(&["a", "Root", "off", "0", "the root"]), true).unwrap();
        assert_eq!(items[0].item.tip.as_deref(), Some("the root"));
    }

    #[test]
    fn bad_tree_depths_are_usage_errors() {
        let skip = parse_tree_items(&args(&["a", "A", "off", "1"]), false);
        assert!(matches!(skip, Err(Error::Usage(_))));
        let deep = parse_tree_items(&args(&["a", "A", "off", "0", "b", "B", "off", "25"]), false);
        assert!(matches!(deep, Err(Error::Usage(_))));
        let word = parse_tree_items(&args(&["a", "A", "off", "x"]), false);
        assert!(matches!(word, Err(Error::Usage(_))));
        let short = parse_tree_items(&args(&["a", "A", "off"]), false);
        assert!(matches!(short, Err(Error::Usage(_))));
    }

    #[test]
    fn build_list_moves_items_between_columns() {
        let items = parse_items(
            &args(&["1", "A", "off", "2", "B", "on", "3", "C", "off", "4", "D", "unavailable"]),
            CHECK,
        )
        .unwrap();
        let mut list = BuildList::new(items);
        assert_eq!(list.available(), [0, 2, 3]);
        assert_eq!(list.chosen(), [1]);

        assert!(list.add(2));
        assert!(list.add(0));
        assert!(!list.add(0));
        assert!(!list.add(3));
        assert_eq!(list.format_chosen("/"), "2/3/1\n");

        assert!(list.remove(1));
        assert!(!list.remove(1));
        assert_eq!(list.available(), [1, 3]);
        assert_eq!(list.format_chosen(" "), "3 1\n");
    }

    #[test]
    fn empty_build_list_prints_nothing() {
        let items = parse_items(&args(&["1", "A", "off"]), CHECK).unwrap();
        assert_eq!(BuildList::new(items).format_chosen("/"), "");
    }
}
