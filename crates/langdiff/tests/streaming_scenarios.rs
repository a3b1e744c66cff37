//! End-to-end parser scenarios: schemas driven by chunked feeds, checked
//! against the full externally observable callback sequence.

use std::cell::RefCell;
use std::rc::Rc;

use langdiff::{array, atom, number, object, scoped, string, Parser, Schema};
use serde_json::json;

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[test]
fn string_streams_across_chunk_boundaries() {
    let schema = object([("message", string())]);
    let mut root = schema.create();
    let events = log();

    let sink = events.clone();
    let message = root
        .as_object_mut()
        .unwrap()
        .field_mut("message")
        .unwrap()
        .as_string_mut()
        .unwrap();
    message.on_append(move |chunk| sink.borrow_mut().push(format!("append {chunk}")));
    let sink = events.clone();
    message.on_complete(move |v| {
        sink.borrow_mut()
            .push(format!("complete {}", v.unwrap_or("<null>")));
    });

    scoped(&mut root, |parser| {
        parser.push("{\"mess")?;
        parser.push("age\": \"Hel")?;
        parser.push("lo\"}")
    })
    .unwrap();

    assert_eq!(*events.borrow(), ["append Hel", "append lo", "complete Hello"]);
}

#[test]
fn earlier_field_completes_before_later_field_starts() {
    let schema = object([("a", string()), ("b", string())]);
    let mut root = schema.create();
    let events = log();

    for key in ["a", "b"] {
        let field = root
            .as_object_mut()
            .unwrap()
            .field_mut(key)
            .unwrap()
            .as_string_mut()
            .unwrap();
        let sink = events.clone();
        field.on_start(move || sink.borrow_mut().push(format!("{key} start")));
        let sink = events.clone();
        field.on_append(move |chunk| sink.borrow_mut().push(format!("{key} append {chunk}")));
        let sink = events.clone();
        field.on_complete(move |v| {
            sink.borrow_mut()
                .push(format!("{key} complete {}", v.unwrap_or("<null>")));
        });
    }

    scoped(&mut root, |parser| parser.push("{\"a\":\"x\",\"b\":\"y\"}")).unwrap();

    assert_eq!(
        *events.borrow(),
        [
            "a start",
            "a append x",
            "a complete x",
            "b start",
            "b append y",
            "b complete y",
        ]
    );
}

#[test]
fn array_of_strings_streams_item_by_item() {
    let schema = object([("items", array(string()))]);
    let mut root = schema.create();
    let events = log();

    let sink = events.clone();
    root.as_object_mut()
        .unwrap()
        .field_mut("items")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .on_append(move |child, index| {
            sink.borrow_mut().push(format!("item {index}"));
            let inner = sink.clone();
            let child = child.as_string_mut().unwrap();
            child.on_append(move |chunk| inner.borrow_mut().push(format!("append {chunk}")));
            let inner = sink.clone();
            child.on_complete(move |v| {
                inner
                    .borrow_mut()
                    .push(format!("complete {}", v.unwrap_or("<null>")));
            });
        });

    scoped(&mut root, |parser| {
        parser.push("{\"items\":[\"Buy a b")?;
        parser.push("anana\",\"Pack b")?;
        parser.push("ags\"]}")
    })
    .unwrap();

    assert_eq!(
        *events.borrow(),
        [
            "item 0",
            "append Buy a b",
            "append anana",
            "complete Buy a banana",
            "item 1",
            "append Pack b",
            "append ags",
            "complete Pack bags",
        ]
    );
}

#[test]
fn null_list_completes_empty_without_appends() {
    let schema = object([("items", array(string()))]);
    let mut root = schema.create();
    let events = log();

    let items = root
        .as_object_mut()
        .unwrap()
        .field_mut("items")
        .unwrap()
        .as_array_mut()
        .unwrap();
    let sink = events.clone();
    items.on_append(move |_, index| sink.borrow_mut().push(format!("item {index}")));
    let sink = events.clone();
    items.on_complete(move |v| sink.borrow_mut().push(format!("complete {v}")));

    scoped(&mut root, |parser| parser.push("{\"items\":null}")).unwrap();

    assert_eq!(*events.borrow(), ["complete []"]);
}

fn create_blocks_schema() -> Schema {
    object([(
        "blocks",
        array(object([
            ("id", string()),
            ("title", string()),
            ("labels", array(string())),
            ("minutes", number()),
        ])),
    )])
}

/// The full nested-registration workflow: handlers attach to children as
/// the stream reveals them, and every lifecycle event arrives in document
/// order even when the feed is one character at a time.
#[test]
fn nested_blocks_fire_the_full_event_sequence() {
    let mut root = create_blocks_schema().create();
    let events = log();

    let sink = events.clone();
    root.as_object_mut()
        .unwrap()
        .field_mut("blocks")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .on_append(move |block, index| {
            sink.borrow_mut().push(format!("block {index}"));
            let block = block.as_object_mut().unwrap();

            let inner = sink.clone();
            block
                .field_mut("id")
                .unwrap()
                .as_string_mut()
                .unwrap()
                .on_complete(move |v| {
                    inner
                        .borrow_mut()
                        .push(format!("id {index} {}", v.unwrap_or("<null>")));
                });

            let title = block.field_mut("title").unwrap().as_string_mut().unwrap();
            let inner = sink.clone();
            title.on_append(move |chunk| {
                inner.borrow_mut().push(format!("title {index} +{chunk}"));
            });
            let inner = sink.clone();
            title.on_complete(move |v| {
                inner
                    .borrow_mut()
                    .push(format!("title {index} ={}", v.unwrap_or("<null>")));
            });

            let inner = sink.clone();
            block
                .field_mut("labels")
                .unwrap()
                .as_array_mut()
                .unwrap()
                .on_append(move |label, _| {
                    inner.borrow_mut().push(format!("label {index}"));
                    let deepest = inner.clone();
                    label.as_string_mut().unwrap().on_complete(move |v| {
                        deepest
                            .borrow_mut()
                            .push(format!("label {index} ={}", v.unwrap_or("<null>")));
                    });
                });

            let inner = sink.clone();
            block
                .field_mut("minutes")
                .unwrap()
                .as_atom_mut()
                .unwrap()
                .on_complete(move |v| {
                    inner.borrow_mut().push(format!("minutes {index} {v}"));
                });

            let inner = sink.clone();
            block.on_complete(move |_| inner.borrow_mut().push(format!("block {index} done")));
        });

    let sink = events.clone();
    root.as_object_mut()
        .unwrap()
        .field_mut("blocks")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .on_complete(move |v| {
            let count = v.as_array().map_or(0, Vec::len);
            sink.borrow_mut().push(format!("blocks done {count}"));
        });

    let full = json!({
        "blocks": [
            {
                "id": "block1",
                "title": "Block One",
                "labels": ["label1", "label2"],
                "minutes": 10,
                "score": 0.9,
            },
            {
                "id": "block2",
                "title": "Block Two",
                "labels": ["label3"],
                "minutes": 5,
                "score": 0.8,
            },
        ]
    })
    .to_string();

    scoped(&mut root, |parser| {
        for ch in full.chars() {
            parser.push(&ch.to_string())?;
        }
        Ok(())
    })
    .unwrap();

    let expected: Vec<String> = [
        "block 0",
        "id 0 block1",
        "title 0 +B",
        "title 0 +l",
        "title 0 +o",
        "title 0 +c",
        "title 0 +k",
        "title 0 + ",
        "title 0 +O",
        "title 0 +n",
        "title 0 +e",
        "title 0 =Block One",
        "label 0",
        "label 0 =label1",
        "label 0",
        "label 0 =label2",
        "minutes 0 10",
        "block 0 done",
        "block 1",
        "id 1 block2",
        "title 1 +B",
        "title 1 +l",
        "title 1 +o",
        "title 1 +c",
        "title 1 +k",
        "title 1 + ",
        "title 1 +T",
        "title 1 +w",
        "title 1 +o",
        "title 1 =Block Two",
        "label 1",
        "label 1 =label3",
        "minutes 1 5",
        "block 1 done",
        "blocks done 2",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(*events.borrow(), expected);
}

#[test]
fn atom_fields_validate_lazily_and_complete_in_order() {
    let schema = object([
        ("title", atom(json!({"type": "string"}))),
        ("item", atom(json!({"type": "object"}))),
    ]);
    let mut root = schema.create();
    let events = log();

    for key in ["title", "item"] {
        let sink = events.clone();
        root.as_object_mut()
            .unwrap()
            .field_mut(key)
            .unwrap()
            .as_atom_mut()
            .unwrap()
            .on_complete(move |v| sink.borrow_mut().push(format!("{key} {v}")));
    }

    let mut parser = Parser::new(&mut root);
    parser.push("{\"title\": \"Title\"").unwrap();
    assert!(events.borrow().is_empty());
    parser.push(", \"item\": {\"name\": \"item1\"").unwrap();
    assert_eq!(*events.borrow(), ["title \"Title\""]);
    parser.push("}}").unwrap();
    parser.complete().unwrap();
    assert_eq!(
        *events.borrow(),
        ["title \"Title\"", "item {\"name\":\"item1\"}"]
    );
}

#[test]
fn atom_list_announces_items_only_when_final() {
    let schema = object([("items", array(number()))]);
    let mut root = schema.create();
    let events = log();

    let items = root
        .as_object_mut()
        .unwrap()
        .field_mut("items")
        .unwrap()
        .as_array_mut()
        .unwrap();
    let sink = events.clone();
    items.on_append(move |child, index| {
        sink.borrow_mut().push(format!("item {index} {}", child.value()));
    });
    let sink = events.clone();
    items.on_complete(move |v| sink.borrow_mut().push(format!("done {v}")));

    let mut parser = Parser::new(&mut root);
    parser.push("{\"items\": [1").unwrap();
    assert!(events.borrow().is_empty());
    // "3" is still a partial number here, so only [1, 2] is observable and
    // only the first item is known final.
    parser.push(", 2, 3").unwrap();
    assert_eq!(*events.borrow(), ["item 0 1"]);
    parser.push("]}").unwrap();
    assert_eq!(*events.borrow(), ["item 0 1", "item 1 2"]);
    parser.complete().unwrap();
    assert_eq!(
        *events.borrow(),
        ["item 0 1", "item 1 2", "item 2 3", "done [1,2,3]"]
    );
}

#[test]
fn null_string_field_completes_as_null() {
    let schema = object([("item", string())]);
    let mut root = schema.create();
    let events = log();

    let item = root
        .as_object_mut()
        .unwrap()
        .field_mut("item")
        .unwrap()
        .as_string_mut()
        .unwrap();
    let sink = events.clone();
    item.on_append(move |chunk| sink.borrow_mut().push(format!("append {chunk}")));
    let sink = events.clone();
    item.on_complete(move |v| {
        sink.borrow_mut()
            .push(format!("complete {}", v.unwrap_or("<null>")));
    });

    scoped(&mut root, |parser| parser.push("{\"item\": null}")).unwrap();

    assert_eq!(*events.borrow(), ["complete <null>"]);
}

#[test]
fn empty_string_value_appends_once() {
    let schema = object([("id", string()), ("title", string())]);
    let mut root = schema.create();
    let events = log();

    let id = root
        .as_object_mut()
        .unwrap()
        .field_mut("id")
        .unwrap()
        .as_string_mut()
        .unwrap();
    let sink = events.clone();
    id.on_append(move |chunk| sink.borrow_mut().push(format!("append {chunk:?}")));
    let sink = events.clone();
    id.on_complete(move |v| sink.borrow_mut().push(format!("complete {v:?}")));

    scoped(&mut root, |parser| {
        parser.push("{\"id\": \"\", \"title\": \"Block One\"}")
    })
    .unwrap();

    assert_eq!(*events.borrow(), ["append \"\"", "complete Some(\"\")"]);
}

#[test]
fn truncated_stream_completes_with_partials() {
    let schema = object([("title", string()), ("minutes", number())]);
    let mut root = schema.create();
    let events = log();

    let sink = events.clone();
    root.as_object_mut()
        .unwrap()
        .field_mut("minutes")
        .unwrap()
        .as_atom_mut()
        .unwrap()
        .on_complete(move |v| sink.borrow_mut().push(format!("minutes {v}")));

    // The stream dies mid-number; complete() still delivers what is
    // unambiguous.
    let mut parser = Parser::new(&mut root);
    parser.push("{\"title\": \"T\", \"minutes\": 12").unwrap();
    parser.complete().unwrap();
    assert_eq!(*events.borrow(), ["minutes 12"]);
    assert_eq!(root.value(), json!({"title": "T", "minutes": 12}));
}

#[test]
fn rebuilt_schema_streams_like_the_declared_one() {
    let external = json!({
        "type": "object",
        "properties": {
            "message": {"type": "string"},
            "count": {"type": "integer"},
        },
    });
    let schema = langdiff::from_external_schema(&external).unwrap();
    let mut root = schema.create();
    let events = log();

    let sink = events.clone();
    root.as_object_mut()
        .unwrap()
        .field_mut("message")
        .unwrap()
        .as_string_mut()
        .unwrap()
        .on_append(move |chunk| sink.borrow_mut().push(format!("+{chunk}")));

    scoped(&mut root, |parser| {
        parser.push("{\"message\": \"ok\", \"count\": 3}")
    })
    .unwrap();

    assert_eq!(*events.borrow(), ["+ok"]);
    assert_eq!(root.value(), json!({"message": "ok", "count": 3}));
}
