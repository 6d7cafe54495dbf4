use crate::spectrum::Spectrum;

#[derive(Debug, Copy, Clone)]
pub struct ConstantTexture {
    value: Spectrum,
}

impl ConstantTexture {
    pub fn new(value: Spectrum) -> ConstantTexture {
        ConstantTexture { value }
    }

    pub fn eval(&self) -> Spectrum {
        self.value
    }
}
