// The display collaborator. The simulation only ever talks about logical
// cells; whatever sits behind this trait decides what a cell looks like.
pub trait Display {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn draw_cell(&mut self, x: u16, y: u16, on: bool);
    fn clear(&mut self, on: bool);
    fn present(&mut self);
}

// In-memory display. Serves the headless binary and gives tests a way to
// assert on the exact frame the game asked for.
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<bool>,
    frames_presented: u64,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
            frames_presented: 0,
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> bool {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn lit_cells(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Display for FrameBuffer {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn draw_cell(&mut self, x: u16, y: u16, on: bool) {
        if x < self.width && y < self.height {
            self.cells[y as usize * self.width as usize + x as usize] = on;
        }
    }

    fn clear(&mut self, on: bool) {
        self.cells.fill(on);
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}
