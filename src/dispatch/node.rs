use crate::core::{
    Advance, Charge, Delivery, Discount, DueDate, Instructions, Invoice, Item, Line, LineDiscount,
    Note, Ordering, Outlay, Party, Payment, Preceding, Tax, Terms,
};
use crate::tax::Combo;

/// The kinds of document node that addons and regimes can hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Invoice,
    Tax,
    Party,
    Line,
    Item,
    LineDiscount,
    Combo,
    Discount,
    Charge,
    Outlay,
    Ordering,
    Payment,
    Terms,
    DueDate,
    Advance,
    Instructions,
    Delivery,
    Note,
    Preceding,
}

/// A shared reference to one node of a document.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Invoice(&'a Invoice),
    Tax(&'a Tax),
    Party(&'a Party),
    Line(&'a Line),
    Item(&'a Item),
    LineDiscount(&'a LineDiscount),
    Combo(&'a Combo),
    Discount(&'a Discount),
    Charge(&'a Charge),
    Outlay(&'a Outlay),
    Ordering(&'a Ordering),
    Payment(&'a Payment),
    Terms(&'a Terms),
    DueDate(&'a DueDate),
    Advance(&'a Advance),
    Instructions(&'a Instructions),
    Delivery(&'a Delivery),
    Note(&'a Note),
    Preceding(&'a Preceding),
}

/// An exclusive reference to one node of a document, handed to normalizers.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Invoice(&'a mut Invoice),
    Tax(&'a mut Tax),
    Party(&'a mut Party),
    Line(&'a mut Line),
    Item(&'a mut Item),
    LineDiscount(&'a mut LineDiscount),
    Combo(&'a mut Combo),
    Discount(&'a mut Discount),
    Charge(&'a mut Charge),
    Outlay(&'a mut Outlay),
    Ordering(&'a mut Ordering),
    Payment(&'a mut Payment),
    Terms(&'a mut Terms),
    DueDate(&'a mut DueDate),
    Advance(&'a mut Advance),
    Instructions(&'a mut Instructions),
    Delivery(&'a mut Delivery),
    Note(&'a mut Note),
    Preceding(&'a mut Preceding),
}

macro_rules! node_kind {
    ($node:expr, $($variant:ident),+ $(,)?) => {
        match $node {
            $(Self::$variant(_) => NodeKind::$variant,)+
        }
    };
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        node_kind!(
            self, Invoice, Tax, Party, Line, Item, LineDiscount, Combo, Discount, Charge, Outlay,
            Ordering, Payment, Terms, DueDate, Advance, Instructions, Delivery, Note, Preceding,
        )
    }
}

impl NodeMut<'_> {
    pub fn kind(&self) -> NodeKind {
        node_kind!(
            self, Invoice, Tax, Party, Line, Item, LineDiscount, Combo, Discount, Charge, Outlay,
            Ordering, Payment, Terms, DueDate, Advance, Instructions, Delivery, Note, Preceding,
        )
    }
}
