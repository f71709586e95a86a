use lasergrid_core::{Agent, AgentId, AgentView, Cell, Direction};
use lasergrid_system_path_cost::{PathCoster, PenaltyTuning};
use lasergrid_world::{GridModel, HazardField};

fn room(size: i32, terrain_marks: &[(i32, i32, char)], unit_marks: &[(i32, i32, char)]) -> GridModel {
    let mut terrain = String::new();
    let mut ground = String::new();
    let mut air = String::new();
    for y in (0..size).rev() {
        for x in 0..size {
            let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
            let floor = if edge { '║' } else { '.' };
            let mark = |marks: &[(i32, i32, char)], fallback: char| {
                marks
                    .iter()
                    .find(|(mx, my, _)| *mx == x && *my == y)
                    .map_or(fallback, |(_, _, glyph)| *glyph)
            };
            terrain.push(mark(terrain_marks, floor));
            ground.push(mark(unit_marks, '-'));
            air.push('-');
        }
    }
    GridModel::from_layers([terrain.as_str(), ground.as_str(), air.as_str()]).expect("valid room")
}

fn opponent(id: u32, cell: Cell, idle: bool) -> Agent {
    Agent {
        id: AgentId::new(id),
        cell,
        facing: None,
        airborne: false,
        last_fire_tick: None,
        last_move_tick: 0,
        idle,
        is_zombie: false,
        ammo_ready: true,
    }
}

#[test]
fn open_room_costs_match_manhattan_distance() {
    let grid = room(7, &[], &[]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &AgentView::default());

    assert_eq!(field.cost(Cell::new(1, 1)), 0.0);
    assert_eq!(field.cost(Cell::new(5, 1)), 4.0);
    assert_eq!(field.cost(Cell::new(5, 5)), 8.0);
    assert_eq!(field.arrival_tick(Cell::new(3, 2)), Some(3));
    assert!(field.cost(Cell::new(0, 0)).is_infinite());
    assert!(field.cost(Cell::new(9, 9)).is_infinite());
}

#[test]
fn ranking_never_decreases_along_parent_chain() {
    let grid = room(
        8,
        &[(3, 3, 'B'), (4, 5, 'O'), (2, 5, 'Z'), (6, 6, '▼')],
        &[(5, 2, '→'), (1, 6, '♂')],
    );
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let roster = AgentView::from_agents(vec![opponent(1, Cell::new(6, 3), false)]);
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &roster);

    for cell in grid.cells() {
        let Some(step) = field.parent(cell) else {
            continue;
        };
        let ranking = field.ranking_cost(cell);
        let parent_ranking = field.ranking_cost(step.parent);
        assert!(
            ranking >= parent_ranking + step.direction.cost(),
            "ranking of {cell} dropped below its parent {}",
            step.parent
        );
        assert_eq!(step.parent.step(step.direction), cell);
    }
}

#[test]
fn rostered_agents_are_never_entered() {
    let grid = room(7, &[], &[]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let blocker = Cell::new(3, 1);
    let roster = AgentView::from_agents(vec![opponent(7, blocker, true)]);
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &roster);

    assert!(field.cost(blocker).is_infinite(), "agent cell must stay unreachable");
    for cell in grid.cells() {
        if let Some(step) = field.parent(cell) {
            assert_ne!(step.parent, blocker);
        }
    }
}

#[test]
fn jumps_do_not_land_next_to_active_agents() {
    let grid = room(7, &[], &[]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let roster = AgentView::from_agents(vec![opponent(2, Cell::new(3, 2), false)]);
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &roster);

    let landing = Cell::new(3, 1);
    let step = field.parent(landing).expect("landing reachable by walking");
    assert_eq!(step.direction, Direction::Right);
}

#[test]
fn oncoming_beam_forbids_the_swap() {
    let grid = room(7, &[], &[(4, 1, '←')]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(3, 1), &AgentView::default());

    let beam_cell = Cell::new(4, 1);
    assert_eq!(field.cost(beam_cell), 3.0);
    assert_ne!(field.first_step(beam_cell), Ok(Direction::Right));
}

#[test]
fn beam_on_arrival_diverts_the_route() {
    let grid = room(9, &[(1, 1, '$')], &[(3, 1, '→')]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(5, 1), &AgentView::default());

    let beside = Cell::new(4, 1);
    assert_eq!(field.cost(beside), 3.0, "direct step meets the beam");
    assert_eq!(field.route_danger(beside), 0.0);
    assert_ne!(field.first_step(beside), Ok(Direction::Left));
    assert_eq!(field.route_danger(Cell::new(3, 1)), 0.0);
    assert_eq!(field.first_step(Cell::new(1, 1)), Ok(Direction::LeftJump));
}

#[test]
fn static_danger_marks_boxes_holes_and_blast_rays() {
    let grid = room(7, &[(2, 4, 'B'), (4, 4, 'O')], &[]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let roster = AgentView::from_agents(vec![opponent(3, Cell::new(5, 2), false)]);
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &roster);

    assert_eq!(field.danger(Cell::new(2, 4)), tuning.box_danger);
    assert_eq!(field.danger(Cell::new(4, 4)), tuning.hole_danger);
    let ray = tuning.agent_danger * tuning.opponent_weight;
    assert_eq!(field.danger(Cell::new(1, 2)), ray);
    assert_eq!(field.danger(Cell::new(5, 5)), ray);
    assert_eq!(field.danger(Cell::new(2, 2)), ray);
    assert_eq!(field.danger(Cell::new(1, 1)), 0.0);
}

#[test]
fn boxes_and_holes_are_only_jumped_over() {
    let grid = room(7, &[(2, 1, 'B'), (4, 1, 'O')], &[]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &AgentView::default());

    assert!(field.cost(Cell::new(2, 1)).is_infinite(), "box is never entered");
    assert!(field.cost(Cell::new(4, 1)).is_infinite(), "hole is never entered");

    let over_box = field.parent(Cell::new(3, 1)).expect("landing beyond the box");
    assert_eq!(over_box.parent, Cell::new(1, 1));
    assert_eq!(over_box.direction, Direction::RightJump);

    let far = Cell::new(5, 1);
    assert_eq!(field.cost(far), 4.0);
    let over_hole = field.parent(far).expect("landing beyond the hole");
    assert_eq!(over_hole.parent, Cell::new(3, 1));
    assert_eq!(over_hole.direction, Direction::RightJump);
    assert_eq!(field.first_step(far), Ok(Direction::RightJump));
}

#[test]
fn jumps_never_land_on_boxes() {
    let grid = room(7, &[(2, 1, 'B'), (3, 1, 'B')], &[]);
    let hazards = HazardField::build(&grid, 10);
    let tuning = PenaltyTuning::default();
    let field = PathCoster::new(&grid, &hazards, &tuning).sweep(Cell::new(1, 1), &AgentView::default());

    for cell in grid.cells() {
        if let Some(step) = field.parent(cell) {
            assert!(!grid.boxes().contains(&cell), "{cell} holds a box");
            assert!(!grid.boxes().contains(&step.parent));
        }
    }
    assert!(field.cost(Cell::new(4, 1)).is_finite());
}
