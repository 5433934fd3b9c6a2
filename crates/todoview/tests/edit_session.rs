//! Inline editing: enter, commit through blur or Enter, cancel through Escape.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use todoview::{
    AppEvent, AppEventKind, CANCEL_FLAG, Command, ENTER_KEY, ESCAPE_KEY, EditPhase, Item, ItemId,
    MarkupTemplate, MemoryDocument, NodeId, Surface, View,
};

type Log = Rc<RefCell<Vec<AppEvent>>>;
type TestView = View<MemoryDocument, MarkupTemplate>;

fn editable_list(items: Vec<Item>) -> (MemoryDocument, Rc<TestView>, Log) {
    let doc = MemoryDocument::from_markup("<ul class=\"todo-list\"></ul><input class=\"new-todo\">");
    let view = Rc::new(View::new(doc.clone(), MarkupTemplate::new()));
    view.render(Command::ShowEntries(items));

    let log: Log = Rc::default();
    for kind in [AppEventKind::ItemEditDone, AppEventKind::ItemEditCancel] {
        let sink = Rc::clone(&log);
        view.bind(kind, move |event: AppEvent| sink.borrow_mut().push(event));
    }
    (doc, view, log)
}

fn item(doc: &MemoryDocument, id: u64) -> NodeId {
    doc.query(&format!("li[data-id=\"{id}\"]")).expect("item node")
}

fn edit_field(doc: &MemoryDocument, id: u64) -> Option<NodeId> {
    doc.query_within(&item(doc, id), "input.edit")
}

fn start_editing(view: &TestView, id: u64, title: &str) {
    view.render(Command::EditItem {
        id: ItemId(id),
        title: title.to_owned(),
    });
}

#[test]
fn edit_item_creates_one_focused_seeded_field() {
    let (doc, view, _) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");

    let node = item(&doc, 1);
    let fields = doc.query_all_within(&node, "input.edit");
    assert_eq!(fields.len(), 1);
    assert_eq!(doc.value(&fields[0]), "A");
    assert_eq!(doc.focused(), Some(fields[0]));
    assert!(doc.has_class(&node, "editing"));
    assert_eq!(
        view.edit_phase(ItemId(1)),
        Some(EditPhase::Editing { cancelled: false })
    );
}

#[test]
fn blur_commits_exactly_once() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");
    let field = edit_field(&doc, 1).unwrap();

    doc.blur(&field);
    doc.blur(&field);
    assert_eq!(
        *log.borrow(),
        vec![AppEvent::ItemEditDone {
            id: ItemId(1),
            title: "A".to_owned()
        }]
    );
}

#[test]
fn blur_reports_the_typed_title() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");
    let field = edit_field(&doc, 1).unwrap();

    doc.type_text(field, "Apples");
    doc.blur(&field);
    assert_eq!(
        *log.borrow(),
        vec![AppEvent::ItemEditDone {
            id: ItemId(1),
            title: "Apples".to_owned()
        }]
    );
}

#[test]
fn enter_forces_the_commit() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");
    let field = edit_field(&doc, 1).unwrap();

    doc.key_press(field, 65);
    assert!(log.borrow().is_empty());
    doc.key_press(field, ENTER_KEY);
    assert_eq!(doc.focused(), None);
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].kind(), AppEventKind::ItemEditDone);
}

#[test]
fn edit_item_done_restores_display() {
    let (doc, view, _) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");
    view.render(Command::EditItemDone {
        id: ItemId(1),
        title: "B".to_owned(),
    });

    let node = item(&doc, 1);
    assert!(edit_field(&doc, 1).is_none());
    assert!(!doc.has_class(&node, "editing"));
    assert_eq!(doc.text_content(doc.query_within(&node, "label").unwrap()), "B");
    assert_eq!(view.edit_phase(ItemId(1)), Some(EditPhase::Display));
    assert_eq!(view.edit_phase(ItemId(99)), None);
}

#[test]
fn escape_cancels_without_committing() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");
    let field = edit_field(&doc, 1).unwrap();

    doc.type_text(field, "discarded");
    doc.key_up(field, ESCAPE_KEY);

    assert_eq!(*log.borrow(), vec![AppEvent::ItemEditCancel { id: ItemId(1) }]);
    assert_eq!(doc.attribute(&field, CANCEL_FLAG).as_deref(), Some("true"));
    assert_eq!(doc.focused(), None);
    assert_eq!(
        view.edit_phase(ItemId(1)),
        Some(EditPhase::Editing { cancelled: true }),
        "cancelling leaves restoration to the controller"
    );
}

#[test]
fn other_keys_do_not_cancel() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A")]);
    start_editing(&view, 1, "A");
    let field = edit_field(&doc, 1).unwrap();

    doc.key_up(field, ENTER_KEY);
    doc.key_up(field, 66);
    assert!(log.borrow().is_empty());
    assert_eq!(doc.focused(), Some(field));
}

#[test]
fn editing_another_item_commits_the_first() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A"), Item::new(2, "B")]);
    start_editing(&view, 1, "A");
    start_editing(&view, 2, "B");

    assert_eq!(
        *log.borrow(),
        vec![AppEvent::ItemEditDone {
            id: ItemId(1),
            title: "A".to_owned()
        }]
    );
    assert_eq!(doc.focused(), edit_field(&doc, 2));
    assert!(view.edit_phase(ItemId(1)).is_some_and(EditPhase::is_editing));
    assert!(view.edit_phase(ItemId(2)).is_some_and(EditPhase::is_editing));
}

#[test]
fn rerender_during_commit_leaves_nothing_focused() {
    let (doc, view, log) = editable_list(vec![Item::new(1, "A"), Item::new(2, "B")]);
    let controller = Rc::clone(&view);
    let sink = Rc::clone(&log);
    view.bind(AppEventKind::ItemEditDone, move |event: AppEvent| {
        sink.borrow_mut().push(event);
        controller.render(Command::ShowEntries(vec![Item::new(1, "A"), Item::new(2, "B")]));
    });

    start_editing(&view, 1, "A");
    start_editing(&view, 2, "B");

    assert_eq!(log.borrow().len(), 1);
    assert_eq!(doc.focused(), None);
    assert_eq!(view.edit_phase(ItemId(2)), Some(EditPhase::Display));
}

#[test]
fn controller_round_trip() {
    let doc = MemoryDocument::from_markup("<ul class=\"todo-list\"></ul>");
    let view = Rc::new(View::new(doc.clone(), MarkupTemplate::new()));
    let items = Rc::new(RefCell::new(vec![Item::new(1, "A"), Item::new(2, "B")]));
    view.render(Command::ShowEntries(items.borrow().clone()));

    let controller = Rc::clone(&view);
    let titles = Rc::clone(&items);
    view.bind(AppEventKind::ItemEdit, move |event| {
        if let AppEvent::ItemEdit { id } = event {
            let title = titles
                .borrow()
                .iter()
                .find(|item| item.id == id)
                .map(|item| item.title.clone())
                .unwrap_or_default();
            controller.render(Command::EditItem { id, title });
        }
    });

    let controller = Rc::clone(&view);
    let store = Rc::clone(&items);
    view.bind(AppEventKind::ItemEditDone, move |event| {
        if let AppEvent::ItemEditDone { id, title } = event {
            if let Some(item) = store.borrow_mut().iter_mut().find(|item| item.id == id) {
                item.title.clone_from(&title);
            }
            controller.render(Command::EditItemDone { id, title });
        }
    });

    let controller = Rc::clone(&view);
    let store = Rc::clone(&items);
    view.bind(AppEventKind::ItemEditCancel, move |event| {
        if let AppEvent::ItemEditCancel { id } = event {
            let title = store
                .borrow()
                .iter()
                .find(|item| item.id == id)
                .map(|item| item.title.clone())
                .unwrap_or_default();
            controller.render(Command::EditItemDone { id, title });
        }
    });

    doc.double_click(doc.query("li[data-id=\"2\"] label").unwrap());
    let field = edit_field(&doc, 2).unwrap();
    doc.type_text(field, "Bananas");
    doc.key_press(field, ENTER_KEY);

    assert_eq!(items.borrow()[1].title, "Bananas");
    assert_eq!(doc.text_content(item(&doc, 2)), "Bananas");
    assert_eq!(view.edit_phase(ItemId(2)), Some(EditPhase::Display));

    doc.double_click(doc.query("li[data-id=\"1\"] label").unwrap());
    let field = edit_field(&doc, 1).unwrap();
    doc.type_text(field, "ignored");
    doc.key_up(field, ESCAPE_KEY);

    assert_eq!(items.borrow()[0].title, "A");
    assert_eq!(doc.text_content(item(&doc, 1)), "A");
    assert_eq!(view.edit_phase(ItemId(1)), Some(EditPhase::Display));
}
