//! Property tests for entity decoding, tree links, traversal order and the arena

use insitu_xml::dom::{Arena, ArenaPolicy};
use insitu_xml::{parse, AttrId, Document, NodeId, PrintOptions};
use proptest::prelude::*;

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

/// Straightforward copy-based decoder to compare the in-place one against
fn reference_decode(raw: &str) -> String {
    let mut out = String::new();
    let mut rest = raw;
    'outer: while let Some(c) = rest.chars().next() {
        for (entity, decoded) in ENTITIES {
            if rest.starts_with(entity) {
                out.push(decoded);
                rest = &rest[entity.len()..];
                continue 'outer;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Raw text made of entity references, fragments of them and plain characters
fn raw_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("&amp;".to_string()),
            Just("&lt;".to_string()),
            Just("&gt;".to_string()),
            Just("&quot;".to_string()),
            Just("&apos;".to_string()),
            Just("&am".to_string()),
            Just("&#65;".to_string()),
            "[a-z &;#>'é]{1,4}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn check_links(doc: &Document, parent: NodeId, expected: &[NodeId]) {
    let forward: Vec<NodeId> = doc.children(parent).collect();
    assert_eq!(forward, expected);

    let mut backward = Vec::new();
    let mut cur = doc.last_child(parent);
    while let Some(id) = cur {
        backward.push(id);
        cur = doc.prev_sibling(id);
    }
    backward.reverse();
    assert_eq!(backward, expected);

    assert_eq!(doc.first_child(parent).is_none(), doc.last_child(parent).is_none());
    if let Some(first) = doc.first_child(parent) {
        assert!(doc.prev_sibling(first).is_none());
    }
    if let Some(last) = doc.last_child(parent) {
        assert!(doc.next_sibling(last).is_none());
    }
    for &child in expected {
        assert_eq!(doc.parent(child), Some(parent));
    }
}

#[derive(Debug, Clone)]
enum Op {
    Append(usize),
    Prepend(usize),
    Insert(usize, usize),
    RemoveFirst(usize),
    RemoveLast(usize),
    Remove(usize, usize),
    Move(usize, usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<usize>().prop_map(Op::Append),
        any::<usize>().prop_map(Op::Prepend),
        (any::<usize>(), any::<usize>()).prop_map(|(p, k)| Op::Insert(p, k)),
        any::<usize>().prop_map(Op::RemoveFirst),
        any::<usize>().prop_map(Op::RemoveLast),
        (any::<usize>(), any::<usize>()).prop_map(|(p, k)| Op::Remove(p, k)),
        (any::<usize>(), any::<usize>(), any::<usize>()).prop_map(|(a, k, b)| Op::Move(a, k, b)),
    ]
}

fn check_attribute_links(doc: &Document, owner: NodeId) -> usize {
    let forward: Vec<AttrId> = doc.attributes(owner).collect();
    let mut backward = Vec::new();
    let mut cur = doc.last_attribute(owner);
    while let Some(id) = cur {
        backward.push(id);
        cur = doc.attr(id).prev();
    }
    backward.reverse();
    assert_eq!(backward, forward);
    if let Some(&first) = forward.first() {
        assert!(doc.attr(first).prev().is_none());
    }
    if let Some(&last) = forward.last() {
        assert!(doc.attr(last).next().is_none());
    }
    for &id in &forward {
        assert_eq!(doc.attr(id).parent(), Some(owner));
    }
    forward.len()
}

/// Well-formed element markup with attributes, text, comments and CDATA
fn element_markup() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z ]{1,6}",
        Just("a &amp; b".to_string()),
        Just("<!--note-->".to_string()),
        Just("<![CDATA[<raw>]]>".to_string()),
        "[a-z]{1,3}".prop_map(|n| format!("<{n}/>")),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        (
            "[a-z]{1,3}",
            prop::collection::vec(("[a-z]{1,3}", "[a-z0-9 ]{0,5}"), 0..4),
            prop::collection::vec(inner, 0..6),
        )
            .prop_map(|(name, attrs, kids)| {
                let attrs: String = attrs
                    .iter()
                    .enumerate()
                    .map(|(i, (n, v))| format!(" {n}{i}=\"{v}\""))
                    .collect();
                format!("<{name}{attrs}>{}</{name}>", kids.concat())
            })
    })
}

fn dfs(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
    out.push(id);
    for child in doc.children(id) {
        dfs(doc, child, out);
    }
}

/// Node `i` (i > 0) hangs under node `parents[i - 1] % i`
fn build_tree(parents: &[usize]) -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let top = doc.create_element("e0");
    doc.append_child(doc.root(), top);
    let mut ids = vec![top];
    for (i, choice) in parents.iter().enumerate() {
        let id = doc.create_element(format!("e{}", i + 1));
        let parent = ids[choice % ids.len()];
        doc.append_child(parent, id);
        ids.push(id);
    }
    (doc, ids)
}

proptest! {
    #[test]
    fn text_decodes_like_reference(raw in raw_text()) {
        let input = format!("<r>x{raw}</r>");
        let doc = parse(input).unwrap();
        let r = doc.root_element().unwrap();
        let expected = format!("x{}", reference_decode(&raw));
        prop_assert_eq!(doc.value(r), expected.as_bytes());
    }

    #[test]
    fn attribute_decodes_like_reference(raw in raw_text()) {
        let input = format!("<r a=\"{raw}\" b='{}'/>", raw.replace('\'', "&apos;"));
        let doc = parse(input).unwrap();
        let r = doc.root_element().unwrap();
        let expected = reference_decode(&raw);
        prop_assert_eq!(doc.attribute_value(r, "a").unwrap(), expected.as_bytes());
        prop_assert_eq!(doc.attribute_value(r, "b").unwrap(), expected.as_bytes());
    }

    #[test]
    fn clean_values_are_unchanged(value in "[a-zA-Z0-9 .,:;#/<>é-]{0,40}") {
        let input = format!("<r v=\"{}\"/>", value.replace('<', "&lt;"));
        let doc = parse(input).unwrap();
        let r = doc.root_element().unwrap();
        prop_assert_eq!(doc.attribute_value(r, "v").unwrap(), value.as_bytes());

        let clean: String = value.chars().filter(|&c| c != '<').collect();
        let input = format!("<r v=\"{clean}\"/>");
        let doc = parse(input.clone()).unwrap();
        let r = doc.root_element().unwrap();
        let span = doc.attr(doc.attribute(r, "v").unwrap()).value_span();
        // No '&' means nothing was rewritten: the value sits where it was read
        prop_assert_eq!(span.offset as usize, "<r v=\"".len());
        prop_assert_eq!(&input.as_bytes()[span.offset as usize..span.end()], clean.as_bytes());
    }

    #[test]
    fn mutations_keep_links_consistent(ops in prop::collection::vec(op(), 0..200)) {
        const PARENTS: usize = 4;
        let mut doc = Document::new();
        let parents: Vec<NodeId> = (0..PARENTS)
            .map(|i| {
                let p = doc.create_element(format!("p{i}"));
                doc.append_child(doc.root(), p);
                p
            })
            .collect();
        let mut model: Vec<Vec<NodeId>> = vec![Vec::new(); PARENTS];

        for op in ops {
            match op {
                Op::Append(p) => {
                    let p = p % PARENTS;
                    let id = doc.create_element("n");
                    doc.append_child(parents[p], id);
                    model[p].push(id);
                }
                Op::Prepend(p) => {
                    let p = p % PARENTS;
                    let id = doc.create_element("n");
                    doc.prepend_child(parents[p], id);
                    model[p].insert(0, id);
                }
                Op::Insert(p, k) => {
                    let p = p % PARENTS;
                    let id = doc.create_element("n");
                    if model[p].is_empty() {
                        doc.append_child(parents[p], id);
                        model[p].push(id);
                    } else {
                        let at = k % model[p].len();
                        doc.insert_before(parents[p], model[p][at], id);
                        model[p].insert(at, id);
                    }
                }
                Op::RemoveFirst(p) => {
                    let p = p % PARENTS;
                    let expected = if model[p].is_empty() { None } else { Some(model[p].remove(0)) };
                    prop_assert_eq!(doc.remove_first_child(parents[p]), expected);
                }
                Op::RemoveLast(p) => {
                    let p = p % PARENTS;
                    prop_assert_eq!(doc.remove_last_child(parents[p]), model[p].pop());
                }
                Op::Remove(p, k) => {
                    let p = p % PARENTS;
                    if !model[p].is_empty() {
                        let at = k % model[p].len();
                        let id = model[p].remove(at);
                        doc.remove_child(parents[p], id);
                        prop_assert!(doc.parent(id).is_none());
                        prop_assert!(doc.prev_sibling(id).is_none());
                        prop_assert!(doc.next_sibling(id).is_none());
                    }
                }
                Op::Move(from, k, to) => {
                    let (from, to) = (from % PARENTS, to % PARENTS);
                    if !model[from].is_empty() {
                        let at = k % model[from].len();
                        let id = model[from].remove(at);
                        doc.remove_child(parents[from], id);
                        doc.append_child(parents[to], id);
                        model[to].push(id);
                    }
                }
            }
        }

        for p in 0..PARENTS {
            check_links(&doc, parents[p], &model[p]);
        }
        check_links(&doc, doc.root(), &parents);
    }

    #[test]
    fn traversal_matches_recursive_dfs(parents in prop::collection::vec(any::<usize>(), 0..120), pick in any::<usize>()) {
        let (doc, ids) = build_tree(&parents);

        let mut expected = Vec::new();
        dfs(&doc, doc.root(), &mut expected);
        let walked: Vec<NodeId> = doc.traverse(doc.root()).collect();
        prop_assert_eq!(&walked, &expected);

        // From an inner node: its subtree, then each following sibling's subtree
        let start = ids[pick % ids.len()];
        let mut expected = Vec::new();
        let mut cur = Some(start);
        while let Some(id) = cur {
            dfs(&doc, id, &mut expected);
            cur = doc.next_sibling(id);
        }
        prop_assert_eq!(doc.traverse(start).collect::<Vec<_>>(), expected);

        let mut subtree = Vec::new();
        dfs(&doc, start, &mut subtree);
        prop_assert_eq!(doc.descendants(start).collect::<Vec<_>>(), subtree);
    }

    #[test]
    fn rendered_tree_reparses_to_same_shape(parents in prop::collection::vec(any::<usize>(), 0..80), pretty in any::<bool>()) {
        let (doc, _) = build_tree(&parents);
        let xml = doc.to_xml(&PrintOptions::default().pretty(pretty));
        let again = parse(xml).unwrap();

        let names = |d: &Document| -> Vec<Vec<u8>> {
            d.traverse(d.root()).map(|id| d.name(id).to_vec()).collect()
        };
        prop_assert_eq!(names(&again), names(&doc));
    }

    #[test]
    fn arena_addresses_are_stable(initial in 0usize..50, max in 0usize..200, count in 0usize..3000) {
        let mut arena = Arena::new(ArenaPolicy { initial, max });
        let mut addresses = Vec::with_capacity(count);
        for i in 0..count {
            let id = arena.alloc(i as u64);
            prop_assert_eq!(id as usize, i);
            addresses.push(&arena[id] as *const u64);
        }
        for (i, addr) in addresses.iter().enumerate() {
            prop_assert_eq!(&arena[i as u32] as *const u64, *addr);
            prop_assert_eq!(arena[i as u32], i as u64);
        }
        prop_assert_eq!(arena.len(), count);
    }

    #[test]
    fn parsed_trees_have_consistent_links(body in element_markup()) {
        let input = format!("<?xml version=\"1.0\"?>\n<root k=\"v\">{body}</root>");
        let doc = parse(input).unwrap();

        let mut nodes = 0;
        let mut attributes = 0;
        for id in doc.descendants(doc.root()) {
            let mut expected = Vec::new();
            let mut cur = doc.first_child(id);
            while let Some(child) = cur {
                expected.push(child);
                cur = doc.next_sibling(child);
            }
            check_links(&doc, id, &expected);
            attributes += check_attribute_links(&doc, id);
            nodes += 1;
        }
        // Everything the parser allocated is reachable from the root
        prop_assert_eq!(nodes, doc.node_count());
        prop_assert_eq!(attributes, doc.attribute_count());
    }

    #[test]
    fn arbitrary_bytes_never_panic(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse(input);
    }

    #[test]
    fn markup_soup_never_panics(input in "[<>/ab!?\\-\\[\\]'\"= &;CDATOYPE\n]{0,96}") {
        if let Ok(doc) = parse(input) {
            let _ = doc.to_xml(&PrintOptions::default());
            let _ = doc.dump(doc.root());
        }
    }
}
