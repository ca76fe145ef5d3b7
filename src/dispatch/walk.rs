//! Deterministic traversal of an invoice's node graph.
//!
//! Both walkers visit each reachable node exactly once, the parent before
//! its children, following field declaration order.

use super::node::{Node, NodeMut};
use crate::core::{Invoice, Line, Payment};

fn field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn indexed(path: &str, name: &str, i: usize) -> String {
    format!("{}[{i}]", field(path, name))
}

/// Visit every node of `invoice` with its dotted field path
/// (`""` for the invoice itself, `lines[0].taxes[1]` for a line combo).
pub fn walk<'a>(invoice: &'a Invoice, visit: &mut dyn FnMut(&str, Node<'a>)) {
    visit("", Node::Invoice(invoice));

    if let Some(tax) = &invoice.tax {
        visit("tax", Node::Tax(tax));
    }
    for (i, p) in invoice.preceding.iter().enumerate() {
        visit(&indexed("", "preceding", i), Node::Preceding(p));
    }
    if let Some(party) = &invoice.supplier {
        visit("supplier", Node::Party(party));
    }
    if let Some(party) = &invoice.customer {
        visit("customer", Node::Party(party));
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        walk_line(&indexed("", "lines", i), line, visit);
    }
    for (i, d) in invoice.discounts.iter().enumerate() {
        let path = indexed("", "discounts", i);
        visit(&path, Node::Discount(d));
        for (j, combo) in d.taxes.iter().enumerate() {
            visit(&indexed(&path, "taxes", j), Node::Combo(combo));
        }
    }
    for (i, c) in invoice.charges.iter().enumerate() {
        let path = indexed("", "charges", i);
        visit(&path, Node::Charge(c));
        for (j, combo) in c.taxes.iter().enumerate() {
            visit(&indexed(&path, "taxes", j), Node::Combo(combo));
        }
    }
    for (i, o) in invoice.outlays.iter().enumerate() {
        let path = indexed("", "outlays", i);
        visit(&path, Node::Outlay(o));
        if let Some(party) = &o.supplier {
            visit(&field(&path, "supplier"), Node::Party(party));
        }
    }
    if let Some(ordering) = &invoice.ordering {
        visit("ordering", Node::Ordering(ordering));
    }
    if let Some(payment) = &invoice.payment {
        walk_payment("payment", payment, visit);
    }
    if let Some(delivery) = &invoice.delivery {
        visit("delivery", Node::Delivery(delivery));
        if let Some(party) = &delivery.receiver {
            visit("delivery.receiver", Node::Party(party));
        }
    }
    for (i, note) in invoice.notes.iter().enumerate() {
        visit(&indexed("", "notes", i), Node::Note(note));
    }
}

fn walk_line<'a>(path: &str, line: &'a Line, visit: &mut dyn FnMut(&str, Node<'a>)) {
    visit(path, Node::Line(line));
    visit(&field(path, "item"), Node::Item(&line.item));
    if let Some(d) = &line.discount {
        visit(&field(path, "discount"), Node::LineDiscount(d));
    }
    for (i, combo) in line.taxes.iter().enumerate() {
        visit(&indexed(path, "taxes", i), Node::Combo(combo));
    }
}

fn walk_payment<'a>(path: &str, payment: &'a Payment, visit: &mut dyn FnMut(&str, Node<'a>)) {
    visit(path, Node::Payment(payment));
    if let Some(party) = &payment.payee {
        visit(&field(path, "payee"), Node::Party(party));
    }
    if let Some(terms) = &payment.terms {
        let terms_path = field(path, "terms");
        visit(&terms_path, Node::Terms(terms));
        for (i, due) in terms.due_dates.iter().enumerate() {
            visit(&indexed(&terms_path, "due_dates", i), Node::DueDate(due));
        }
    }
    for (i, advance) in payment.advances.iter().enumerate() {
        visit(&indexed(path, "advances", i), Node::Advance(advance));
    }
    if let Some(instructions) = &payment.instructions {
        visit(&field(path, "instructions"), Node::Instructions(instructions));
    }
}

/// Visit every node of `invoice` mutably, in the same order as [`walk`].
///
/// Children are read after their parent's visit returns, so a visitor that
/// adds or removes children changes what is visited next.
pub fn walk_mut(invoice: &mut Invoice, visit: &mut dyn FnMut(NodeMut<'_>)) {
    visit(NodeMut::Invoice(&mut *invoice));

    if let Some(tax) = &mut invoice.tax {
        visit(NodeMut::Tax(tax));
    }
    for p in &mut invoice.preceding {
        visit(NodeMut::Preceding(p));
    }
    if let Some(party) = &mut invoice.supplier {
        visit(NodeMut::Party(party));
    }
    if let Some(party) = &mut invoice.customer {
        visit(NodeMut::Party(party));
    }
    for line in &mut invoice.lines {
        walk_line_mut(line, visit);
    }
    for d in &mut invoice.discounts {
        visit(NodeMut::Discount(&mut *d));
        for combo in &mut d.taxes {
            visit(NodeMut::Combo(combo));
        }
    }
    for c in &mut invoice.charges {
        visit(NodeMut::Charge(&mut *c));
        for combo in &mut c.taxes {
            visit(NodeMut::Combo(combo));
        }
    }
    for o in &mut invoice.outlays {
        visit(NodeMut::Outlay(&mut *o));
        if let Some(party) = &mut o.supplier {
            visit(NodeMut::Party(party));
        }
    }
    if let Some(ordering) = &mut invoice.ordering {
        visit(NodeMut::Ordering(ordering));
    }
    if let Some(payment) = &mut invoice.payment {
        walk_payment_mut(payment, visit);
    }
    if let Some(delivery) = &mut invoice.delivery {
        visit(NodeMut::Delivery(&mut *delivery));
        if let Some(party) = &mut delivery.receiver {
            visit(NodeMut::Party(party));
        }
    }
    for note in &mut invoice.notes {
        visit(NodeMut::Note(note));
    }
}

fn walk_line_mut(line: &mut Line, visit: &mut dyn FnMut(NodeMut<'_>)) {
    visit(NodeMut::Line(&mut *line));
    visit(NodeMut::Item(&mut line.item));
    if let Some(d) = &mut line.discount {
        visit(NodeMut::LineDiscount(d));
    }
    for combo in &mut line.taxes {
        visit(NodeMut::Combo(combo));
    }
}

fn walk_payment_mut(payment: &mut Payment, visit: &mut dyn FnMut(NodeMut<'_>)) {
    visit(NodeMut::Payment(&mut *payment));
    if let Some(party) = &mut payment.payee {
        visit(NodeMut::Party(party));
    }
    if let Some(terms) = &mut payment.terms {
        visit(NodeMut::Terms(&mut *terms));
        for due in &mut terms.due_dates {
            visit(NodeMut::DueDate(due));
        }
    }
    for advance in &mut payment.advances {
        visit(NodeMut::Advance(advance));
    }
    if let Some(instructions) = &mut payment.instructions {
        visit(NodeMut::Instructions(instructions));
    }
}

/// Count of nodes reachable from `invoice`.
pub fn node_count(invoice: &Invoice) -> usize {
    let mut count = 0;
    walk(invoice, &mut |_, _| count += 1);
    count
}
